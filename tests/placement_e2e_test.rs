// ==========================================
// 装载流程集成测试
// ==========================================
// 测试范围: 规划 -> 提交 -> 放置确认 -> 不变量保持
// ==========================================

mod helpers;

use cargo_stowage::api::ApiError;
use cargo_stowage::domain::types::{Coordinates, Position};
use helpers::test_data_builder::{ContainerBuilder, ItemBuilder};
use helpers::{create_test_state, test_ts};

// ==========================================
// 场景1: 空柜首件落位于原点
// ==========================================

#[test]
fn test_first_placement_lands_at_origin() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(
            vec![ContainerBuilder::new("C1").dimensions(100, 100, 100).build()],
            "operator1",
        )
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![ItemBuilder::new("I1").footprint(10, 10, 20).build()],
            "operator1",
        )
        .unwrap();

    let plan = state.placement_api.plan_placement("I1").unwrap();
    assert_eq!(plan.container_id, "C1");
    assert_eq!(plan.position.start_coordinates, Coordinates::new(0, 0, 0));
    assert_eq!(plan.position.end_coordinates, Coordinates::new(10, 10, 20));
    assert!(plan.rearrangements.is_empty());
}

// ==========================================
// 场景2: 满柜第二件报无容量
// ==========================================

#[test]
fn test_second_full_size_item_no_capacity() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(
            vec![ContainerBuilder::new("C1").dimensions(100, 100, 100).build()],
            "operator1",
        )
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![
                ItemBuilder::new("I1").footprint(100, 100, 100).build(),
                ItemBuilder::new("I2").footprint(100, 100, 100).build(),
            ],
            "operator1",
        )
        .unwrap();

    // 第一件占满整柜
    let plan = state
        .placement_api
        .place_item("I1", "astronaut1", test_ts())
        .unwrap();
    assert_eq!(plan.container_id, "C1");

    // 第二件同尺寸: 无腾挪可行(同优先级),报无容量
    let err = state.placement_api.plan_placement("I2").unwrap_err();
    assert!(matches!(err, ApiError::NoCapacity(_)));
}

// ==========================================
// 场景3: 规划无副作用,提交才落库
// ==========================================

#[test]
fn test_planning_is_side_effect_free() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "operator1")
        .unwrap();
    state
        .cargo_api
        .add_items(vec![ItemBuilder::new("I1").build()], "operator1")
        .unwrap();

    // 重复规划结果一致且不产生放置
    let a = state.placement_api.plan_placement("I1").unwrap();
    let b = state.placement_api.plan_placement("I1").unwrap();
    assert_eq!(a.position, b.position);
    assert_eq!(a.container_id, b.container_id);

    let search = state.retrieval_api.search(Some("I1"), None).unwrap();
    assert!(search.item.unwrap().container_id.is_none());

    // 提交后才可检索到位置
    state
        .placement_api
        .place_item("I1", "astronaut1", test_ts())
        .unwrap();
    let search = state.retrieval_api.search(Some("I1"), None).unwrap();
    assert_eq!(search.item.unwrap().container_id.as_deref(), Some("C1"));
}

// ==========================================
// 场景4: 偏好区域优先于最佳适配
// ==========================================

#[test]
fn test_preferred_zone_ranks_first() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(
            vec![
                ContainerBuilder::new("C_A")
                    .zone("ZoneA")
                    .dimensions(20, 20, 20)
                    .build(),
                ContainerBuilder::new("C_B")
                    .zone("ZoneB")
                    .dimensions(100, 100, 100)
                    .build(),
            ],
            "operator1",
        )
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![ItemBuilder::new("I1").zone("ZoneB").build()],
            "operator1",
        )
        .unwrap();

    // ZoneA 柜剩余体积更小,但偏好区域 ZoneB 优先
    let plan = state.placement_api.plan_placement("I1").unwrap();
    assert_eq!(plan.container_id, "C_B");
}

// ==========================================
// 场景5: 腾挪端到端
// ==========================================

#[test]
fn test_rearrangement_end_to_end() {
    let (_db, state) = create_test_state();

    // C2 装不下高优先级货物,只能腾挪 C1
    state
        .cargo_api
        .add_containers(
            vec![
                ContainerBuilder::new("C1").zone("ZoneA").build(),
                ContainerBuilder::new("C2")
                    .zone("ZoneB")
                    .dimensions(60, 60, 60)
                    .build(),
            ],
            "operator1",
        )
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![
                ItemBuilder::new("I_low")
                    .footprint(50, 50, 50)
                    .priority(1)
                    .build(),
                ItemBuilder::new("I_hi")
                    .footprint(100, 100, 100)
                    .priority(10)
                    .build(),
            ],
            "operator1",
        )
        .unwrap();

    // 低优先级货物先落位于偏好柜 C1
    state
        .placement_api
        .place_item("I_low", "astronaut1", test_ts())
        .unwrap();

    // 高优先级货物落位触发腾挪: I_low 移往 C2
    let plan = state
        .placement_api
        .place_item("I_hi", "astronaut1", test_ts())
        .unwrap();
    assert_eq!(plan.container_id, "C1");
    assert_eq!(plan.rearrangements.len(), 1);
    assert_eq!(plan.rearrangements[0].item_id, "I_low");
    assert_eq!(plan.rearrangements[0].to_container_id, "C2");

    // 腾挪后两件货物都有有效放置
    let low = state.retrieval_api.search(Some("I_low"), None).unwrap();
    assert_eq!(low.item.unwrap().container_id.as_deref(), Some("C2"));
    let hi = state.retrieval_api.search(Some("I_hi"), None).unwrap();
    assert_eq!(hi.item.unwrap().container_id.as_deref(), Some("C1"));
}

// ==========================================
// 场景6: 放置确认的位置校验
// ==========================================

#[test]
fn test_confirm_placement_validation() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "operator1")
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![
                ItemBuilder::new("I1").footprint(10, 10, 20).build(),
                ItemBuilder::new("I2").footprint(10, 10, 20).build(),
            ],
            "operator1",
        )
        .unwrap();

    let valid = Position::new(Coordinates::new(0, 0, 0), Coordinates::new(10, 10, 20));
    state
        .placement_api
        .confirm_placement(&cargo_stowage::api::placement_api::ConfirmPlacementRequest {
            item_id: "I1".to_string(),
            container_id: "C1".to_string(),
            position: valid,
            user_id: "astronaut1".to_string(),
            timestamp: test_ts(),
        })
        .unwrap();

    // 越界位置拒绝
    let out_of_bounds = Position::new(Coordinates::new(95, 0, 0), Coordinates::new(105, 10, 20));
    let err = state
        .placement_api
        .confirm_placement(&cargo_stowage::api::placement_api::ConfirmPlacementRequest {
            item_id: "I2".to_string(),
            container_id: "C1".to_string(),
            position: out_of_bounds,
            user_id: "astronaut1".to_string(),
            timestamp: test_ts(),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidPosition(_)));

    // 与 I1 重叠的位置拒绝
    let overlapping = Position::new(Coordinates::new(5, 5, 0), Coordinates::new(15, 15, 20));
    let err = state
        .placement_api
        .confirm_placement(&cargo_stowage::api::placement_api::ConfirmPlacementRequest {
            item_id: "I2".to_string(),
            container_id: "C1".to_string(),
            position: overlapping,
            user_id: "astronaut1".to_string(),
            timestamp: test_ts(),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidPosition(_)));

    // 尺寸与货物体积不一致拒绝
    let wrong_extent = Position::new(Coordinates::new(50, 0, 0), Coordinates::new(55, 5, 5));
    let err = state
        .placement_api
        .confirm_placement(&cargo_stowage::api::placement_api::ConfirmPlacementRequest {
            item_id: "I2".to_string(),
            container_id: "C1".to_string(),
            position: wrong_extent,
            user_id: "astronaut1".to_string(),
            timestamp: test_ts(),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidPosition(_)));

    // 面贴合位置允许
    let touching = Position::new(Coordinates::new(10, 0, 0), Coordinates::new(20, 10, 20));
    state
        .placement_api
        .confirm_placement(&cargo_stowage::api::placement_api::ConfirmPlacementRequest {
            item_id: "I2".to_string(),
            container_id: "C1".to_string(),
            position: touching,
            user_id: "astronaut1".to_string(),
            timestamp: test_ts(),
        })
        .unwrap();
}

// ==========================================
// 场景7: 未知货物/货柜
// ==========================================

#[test]
fn test_not_found_errors() {
    let (_db, state) = create_test_state();

    let err = state.placement_api.plan_placement("ghost").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    state
        .cargo_api
        .add_items(vec![ItemBuilder::new("I1").build()], "operator1")
        .unwrap();
    // 没有任何货柜: 无容量
    let err = state.placement_api.plan_placement("I1").unwrap_err();
    assert!(matches!(err, ApiError::NoCapacity(_)));
}

// ==========================================
// 场景8: 货柜删除保护
// ==========================================

#[test]
fn test_delete_container_refused_while_occupied() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "operator1")
        .unwrap();
    state
        .cargo_api
        .add_items(vec![ItemBuilder::new("I1").build()], "operator1")
        .unwrap();
    state
        .placement_api
        .place_item("I1", "astronaut1", test_ts())
        .unwrap();

    let err = state
        .cargo_api
        .delete_container("C1", "operator1")
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // 取用后柜空,允许删除
    state
        .retrieval_api
        .confirm_retrieval("I1", "astronaut1", test_ts())
        .unwrap();
    state.cargo_api.delete_container("C1", "operator1").unwrap();
}

// ==========================================
// 场景9: 重复标识冲突
// ==========================================

#[test]
fn test_duplicate_ids_conflict() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "operator1")
        .unwrap();
    let err = state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "operator1")
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    state
        .cargo_api
        .add_items(vec![ItemBuilder::new("I1").build()], "operator1")
        .unwrap();
    let err = state
        .cargo_api
        .add_items(vec![ItemBuilder::new("I1").build()], "operator1")
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}
