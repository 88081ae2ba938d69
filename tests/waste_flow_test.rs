// ==========================================
// 废弃回收流程集成测试
// ==========================================
// 测试范围: 识别 -> 回收方案 -> 完成下坞
// 时钟初值为 2025-01-01,通过时间推进接口驱动过期
// ==========================================

mod helpers;

use cargo_stowage::api::waste_api::ReturnPlanRequest;
use cargo_stowage::api::ApiError;
use cargo_stowage::domain::types::WasteReason;
use cargo_stowage::engine::simulation::SimulationRequest;
use chrono::NaiveDate;
use helpers::test_data_builder::{ContainerBuilder, ItemBuilder};
use helpers::{create_test_state, test_ts};

fn advance_to(state: &cargo_stowage::AppState, y: i32, m: u32, d: u32) {
    state
        .simulation_api
        .advance_time(&SimulationRequest {
            num_of_days: None,
            to_date: NaiveDate::from_ymd_opt(y, m, d),
            items_used_today: vec![],
        })
        .unwrap();
}

// ==========================================
// 场景: 过期识别
// ==========================================

#[test]
fn test_expired_item_identified() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "op")
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![ItemBuilder::new("I1").expiry(2025, 1, 1).build()],
            "op",
        )
        .unwrap();
    state
        .placement_api
        .place_item("I1", "astronaut1", test_ts())
        .unwrap();

    // 时钟 2025-01-01: expiry < clock 不成立,尚非废弃
    assert!(state.waste_api.identify_waste().unwrap().is_empty());

    // 推进到 2025-02-01 后识别为过期
    advance_to(&state, 2025, 2, 1);
    let records = state.waste_api.identify_waste().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].item_id, "I1");
    assert_eq!(records[0].reason, WasteReason::Expired);
    assert_eq!(records[0].container_id.as_deref(), Some("C1"));
}

#[test]
fn test_expired_precedence_over_out_of_uses() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_items(
            vec![
                // 既过期又用尽
                ItemBuilder::new("both")
                    .expiry(2025, 1, 1)
                    .usage_limit(0)
                    .build(),
                // 仅用尽
                ItemBuilder::new("depleted").usage_limit(0).build(),
            ],
            "op",
        )
        .unwrap();
    advance_to(&state, 2025, 2, 1);

    let records = state.waste_api.identify_waste().unwrap();
    assert_eq!(records.len(), 2);
    let both = records.iter().find(|r| r.item_id == "both").unwrap();
    assert_eq!(both.reason, WasteReason::Expired);
    let depleted = records.iter().find(|r| r.item_id == "depleted").unwrap();
    assert_eq!(depleted.reason, WasteReason::OutOfUses);
}

// ==========================================
// 场景: 回收方案
// ==========================================

#[test]
fn test_return_plan_respects_weight_bound() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "op")
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![
                ItemBuilder::new("W1").expiry(2025, 1, 1).mass(60.0).build(),
                ItemBuilder::new("W2").expiry(2025, 1, 1).mass(60.0).build(),
                ItemBuilder::new("W3").expiry(2025, 1, 1).mass(30.0).build(),
            ],
            "op",
        )
        .unwrap();
    for id in ["W1", "W2", "W3"] {
        state
            .placement_api
            .place_item(id, "astronaut1", test_ts())
            .unwrap();
    }

    let response = state
        .waste_api
        .build_return_plan(&ReturnPlanRequest {
            undocking_container_id: "C1".to_string(),
            undocking_date: "2025-04-01".to_string(),
            max_weight: Some(100.0),
        })
        .unwrap();

    // 贪心: W1(60) 装入, W2 超限跳过, W3(90) 装入
    let manifest = &response.return_manifest;
    assert_eq!(manifest.item_ids(), vec!["W1", "W3"]);
    assert!(manifest.total_weight <= 100.0);
    assert_eq!(
        manifest.undocking_date,
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    );
    // 每件选中货物末尾都有 retrieve 步骤
    assert!(!response.retrieval_steps.is_empty());
}

#[test]
fn test_return_plan_invalid_date() {
    let (_db, state) = create_test_state();
    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "op")
        .unwrap();

    let err = state
        .waste_api
        .build_return_plan(&ReturnPlanRequest {
            undocking_container_id: "C1".to_string(),
            undocking_date: "04/01/2025".to_string(),
            max_weight: None,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));

    let err = state
        .waste_api
        .build_return_plan(&ReturnPlanRequest {
            undocking_container_id: "ghost".to_string(),
            undocking_date: "2025-04-01".to_string(),
            max_weight: None,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_return_plan_capacity_exceeded_when_nothing_fits() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "op")
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![ItemBuilder::new("heavy").expiry(2025, 1, 1).mass(500.0).build()],
            "op",
        )
        .unwrap();
    state
        .placement_api
        .place_item("heavy", "astronaut1", test_ts())
        .unwrap();

    // 存在废弃货物但载重上限装不下任何一件
    let err = state
        .waste_api
        .build_return_plan(&ReturnPlanRequest {
            undocking_container_id: "C1".to_string(),
            undocking_date: "2025-04-01".to_string(),
            max_weight: Some(10.0),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::CapacityExceeded(_)));

    // 无任何废弃货物时返回空方案,不算失败
    let (_db2, clean_state) = create_test_state();
    clean_state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "op")
        .unwrap();
    let response = clean_state
        .waste_api
        .build_return_plan(&ReturnPlanRequest {
            undocking_container_id: "C1".to_string(),
            undocking_date: "2025-04-01".to_string(),
            max_weight: Some(10.0),
        })
        .unwrap();
    assert!(response.return_manifest.return_items.is_empty());
}

// ==========================================
// 场景: 完成下坞
// ==========================================

#[test]
fn test_complete_undocking_removes_selected_items() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "op")
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![
                ItemBuilder::new("W1").expiry(2025, 1, 1).build(),
                ItemBuilder::new("keep").expiry(2026, 1, 1).build(),
            ],
            "op",
        )
        .unwrap();
    state
        .placement_api
        .place_item("W1", "astronaut1", test_ts())
        .unwrap();
    state
        .placement_api
        .place_item("keep", "astronaut1", test_ts())
        .unwrap();

    // 没有挂起舱单时报 NotFound
    let err = state
        .waste_api
        .complete_undocking("C1", "astronaut1", test_ts())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    state
        .waste_api
        .build_return_plan(&ReturnPlanRequest {
            undocking_container_id: "C1".to_string(),
            undocking_date: "2025-04-01".to_string(),
            max_weight: None,
        })
        .unwrap();

    let removed = state
        .waste_api
        .complete_undocking("C1", "astronaut1", test_ts())
        .unwrap();
    assert_eq!(removed, 1);

    // 废弃货物连同放置一并销毁,未选中货物保留
    let err = state.cargo_api.get_item("W1").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert!(state.cargo_api.get_item("keep").is_ok());

    // 舱单已消费,重复下坞报 NotFound
    let err = state
        .waste_api
        .complete_undocking("C1", "astronaut1", test_ts())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
