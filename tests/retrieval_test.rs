// ==========================================
// 检索/取用流程集成测试
// ==========================================
// 测试范围: 搜索 -> 取用规划 -> 取用确认
// ==========================================

mod helpers;

use cargo_stowage::api::ApiError;
use cargo_stowage::domain::types::{Coordinates, Position, RetrievalAction};
use cargo_stowage::api::placement_api::ConfirmPlacementRequest;
use helpers::test_data_builder::{ContainerBuilder, ItemBuilder};
use helpers::{create_test_state, test_ts};

/// 在指定深度处人工确认放置(10x10x10 货物)
fn place_at_depth(state: &cargo_stowage::AppState, item_id: &str, depth: i32) {
    state
        .placement_api
        .confirm_placement(&ConfirmPlacementRequest {
            item_id: item_id.to_string(),
            container_id: "C1".to_string(),
            position: Position::new(
                Coordinates::new(0, depth, 0),
                Coordinates::new(10, depth + 10, 10),
            ),
            user_id: "astronaut1".to_string(),
            timestamp: test_ts(),
        })
        .unwrap();
}

#[test]
fn test_search_by_id_and_name() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").zone("ZoneB").build()], "op")
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![ItemBuilder::new("I1").name("Water Bottle").build()],
            "op",
        )
        .unwrap();
    state
        .placement_api
        .place_item("I1", "astronaut1", test_ts())
        .unwrap();

    // 按标识搜索
    let by_id = state.retrieval_api.search(Some("I1"), None).unwrap();
    assert!(by_id.found);
    let found = by_id.item.unwrap();
    assert_eq!(found.container_id.as_deref(), Some("C1"));
    // 返回货柜实际区域,而非货物偏好区域
    assert_eq!(found.zone.as_deref(), Some("ZoneB"));

    // 按名称搜索
    let by_name = state
        .retrieval_api
        .search(None, Some("Water Bottle"))
        .unwrap();
    assert!(by_name.found);
    assert_eq!(by_name.item.unwrap().item_id, "I1");

    // 查无此物是正常结果
    let missing = state.retrieval_api.search(Some("ghost"), None).unwrap();
    assert!(!missing.found);
    assert!(missing.item.is_none());

    // 两个条件都缺失报参数错误
    let err = state.retrieval_api.search(None, None).unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
}

#[test]
fn test_unobstructed_retrieval_single_step() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "op")
        .unwrap();
    state
        .cargo_api
        .add_items(vec![ItemBuilder::new("I1").build()], "op")
        .unwrap();
    place_at_depth(&state, "I1", 0);

    let steps = state.retrieval_api.plan_retrieval("I1").unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].action, RetrievalAction::Retrieve);
    assert_eq!(steps[0].item_id, "I1");
}

#[test]
fn test_obstructed_retrieval_orders_moves_by_depth() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "op")
        .unwrap();
    state
        .cargo_api
        .add_items(
            vec![
                ItemBuilder::new("target").build(),
                ItemBuilder::new("near").build(),
                ItemBuilder::new("far").build(),
            ],
            "op",
        )
        .unwrap();
    place_at_depth(&state, "near", 0);
    place_at_depth(&state, "far", 30);
    place_at_depth(&state, "target", 60);

    let steps = state.retrieval_api.plan_retrieval("target").unwrap();
    let actions: Vec<(&str, RetrievalAction)> = steps
        .iter()
        .map(|s| (s.item_id.as_str(), s.action))
        .collect();
    assert_eq!(
        actions,
        vec![
            ("near", RetrievalAction::Move),
            ("far", RetrievalAction::Move),
            ("target", RetrievalAction::Retrieve),
        ]
    );
}

#[test]
fn test_confirm_retrieval_decrements_usage_and_clears_placement() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_containers(vec![ContainerBuilder::new("C1").build()], "op")
        .unwrap();
    state
        .cargo_api
        .add_items(vec![ItemBuilder::new("I1").usage_limit(2).build()], "op")
        .unwrap();
    place_at_depth(&state, "I1", 0);

    let confirmation = state
        .retrieval_api
        .confirm_retrieval("I1", "astronaut1", test_ts())
        .unwrap();
    assert_eq!(confirmation.remaining_uses, Some(1));

    // 放置已销毁
    let search = state.retrieval_api.search(Some("I1"), None).unwrap();
    assert!(search.item.unwrap().container_id.is_none());
    let err = state.retrieval_api.plan_retrieval("I1").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    // 无放置的货物仍可确认取用(仅减扣次数),0 处截断
    let confirmation = state
        .retrieval_api
        .confirm_retrieval("I1", "astronaut1", test_ts())
        .unwrap();
    assert_eq!(confirmation.remaining_uses, Some(0));
    let confirmation = state
        .retrieval_api
        .confirm_retrieval("I1", "astronaut1", test_ts())
        .unwrap();
    assert_eq!(confirmation.remaining_uses, Some(0));
}

#[test]
fn test_confirm_retrieval_unlimited_item() {
    let (_db, state) = create_test_state();

    state
        .cargo_api
        .add_items(vec![ItemBuilder::new("I1").build()], "op")
        .unwrap();

    let confirmation = state
        .retrieval_api
        .confirm_retrieval("I1", "astronaut1", test_ts())
        .unwrap();
    // 不限次货物不减扣
    assert_eq!(confirmation.remaining_uses, None);
}

#[test]
fn test_confirm_retrieval_unknown_item() {
    let (_db, state) = create_test_state();
    let err = state
        .retrieval_api
        .confirm_retrieval("ghost", "astronaut1", test_ts())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
