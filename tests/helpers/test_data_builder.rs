// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use cargo_stowage::domain::container::ContainerSpec;
use cargo_stowage::domain::item::ItemSpec;
use chrono::NaiveDate;

// ==========================================
// ItemSpec 构建器
// ==========================================

pub struct ItemBuilder {
    item_id: String,
    name: String,
    width: i32,
    depth: i32,
    height: i32,
    mass: f64,
    priority: i32,
    expiry_date: Option<NaiveDate>,
    usage_limit: Option<i32>,
    preferred_zone: String,
}

impl ItemBuilder {
    pub fn new(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            name: format!("Item {}", item_id),
            width: 10,
            depth: 10,
            height: 10,
            mass: 1.0,
            priority: 1,
            expiry_date: None,
            usage_limit: None,
            preferred_zone: "ZoneA".to_string(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn footprint(mut self, width: i32, depth: i32, height: i32) -> Self {
        self.width = width;
        self.depth = depth;
        self.height = height;
        self
    }

    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn expiry(mut self, y: i32, m: u32, d: u32) -> Self {
        self.expiry_date = NaiveDate::from_ymd_opt(y, m, d);
        self
    }

    pub fn usage_limit(mut self, limit: i32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    pub fn zone(mut self, zone: &str) -> Self {
        self.preferred_zone = zone.to_string();
        self
    }

    pub fn build(self) -> ItemSpec {
        ItemSpec {
            item_id: self.item_id,
            name: self.name,
            width: self.width,
            depth: self.depth,
            height: self.height,
            mass: self.mass,
            priority: self.priority,
            expiry_date: self.expiry_date,
            usage_limit: self.usage_limit,
            preferred_zone: self.preferred_zone,
        }
    }
}

// ==========================================
// ContainerSpec 构建器
// ==========================================

pub struct ContainerBuilder {
    container_id: String,
    zone: String,
    width: i32,
    depth: i32,
    height: i32,
}

impl ContainerBuilder {
    pub fn new(container_id: &str) -> Self {
        Self {
            container_id: container_id.to_string(),
            zone: "ZoneA".to_string(),
            width: 100,
            depth: 100,
            height: 100,
        }
    }

    pub fn zone(mut self, zone: &str) -> Self {
        self.zone = zone.to_string();
        self
    }

    pub fn dimensions(mut self, width: i32, depth: i32, height: i32) -> Self {
        self.width = width;
        self.depth = depth;
        self.height = height;
        self
    }

    pub fn build(self) -> ContainerSpec {
        ContainerSpec {
            container_id: self.container_id,
            zone: self.zone,
            width: self.width,
            depth: self.depth,
            height: self.height,
        }
    }
}
