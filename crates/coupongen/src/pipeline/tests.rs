use crate::{
    Coupon, CouponController, DrawType, Error, ExclusionSet, GenerationRequest, Number, Progress,
    RunState, StaticModel,
};
use core::time::Duration;
use std::{collections::BTreeSet, sync::Arc};
use tokio::time::sleep;

fn pools(raw: &[&[Number]]) -> Vec<BTreeSet<Number>> {
    raw.iter().map(|pool| pool.iter().copied().collect()).collect()
}

fn controller(model: StaticModel, valid_numbers_count: usize) -> CouponController<StaticModel> {
    CouponController::new(Arc::new(model), valid_numbers_count)
}

fn request(target_count: usize, distance: usize) -> GenerationRequest {
    GenerationRequest::default()
        .with_target_count(target_count)
        .with_distance(distance)
        .with_timeout(Duration::from_secs(1))
}

#[tokio::test(start_paused = true)]
async fn produces_every_pair_exactly_once() {
    let model = StaticModel::new(pools(&[&[1, 2], &[3, 4]]), ExclusionSet::new());
    let controller = controller(model, 2);

    let mut handle = controller.start(request(4, 0)).unwrap().unwrap();
    assert_eq!(handle.finished().await, RunState::Completed);

    let coupons = controller.coupons();
    assert_eq!(coupons.len(), 4);
    let produced: BTreeSet<Vec<Number>> = coupons.iter().map(|c| c.values().to_vec()).collect();
    let expected: BTreeSet<Vec<Number>> = [vec![1, 3], vec![1, 4], vec![2, 3], vec![2, 4]].into();
    assert_eq!(produced, expected);
    assert_eq!(*controller.progress().borrow(), 1.0);
    assert_eq!(controller.progress_status(), Progress::Fraction(1.0));
    assert!(!controller.is_generating());
}

#[tokio::test(start_paused = true)]
async fn overlapping_pools_only_yield_one_coupon() {
    let model = StaticModel::new(pools(&[&[1, 2], &[1, 2]]), ExclusionSet::new());
    let controller = controller(model, 2);

    let handle = controller.start(request(2, 0)).unwrap().unwrap();
    sleep(Duration::from_secs(10)).await;

    assert_eq!(handle.state(), RunState::Sampling);
    assert_eq!(controller.coupons(), vec![Coupon::new(vec![1, 2]).unwrap()]);
    assert_eq!(*controller.progress().borrow(), 0.5);

    controller.cancel();
    assert_eq!(handle.state(), RunState::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn inputs_that_never_arrive_time_out() {
    let controller = controller(StaticModel::unresolved(), 6);

    let handle = controller.start(request(5, 0)).unwrap().unwrap();
    assert_eq!(handle.state(), RunState::AwaitingModelData);

    sleep(Duration::from_millis(1_100)).await;

    assert_eq!(*controller.progress().borrow(), 1.0);
    assert!(controller.coupons().is_empty());
    assert_eq!(handle.state(), RunState::TimedOut);
    assert_eq!(*controller.state().borrow(), RunState::TimedOut);
    assert_eq!(controller.progress_status(), Progress::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn one_missing_input_is_enough_to_time_out() {
    let model = StaticModel::full_range(DrawType::Lotto).without_exclusion();
    let controller = CouponController::for_draw_type(Arc::new(model), DrawType::Lotto);

    let mut handle = controller.start(request(3, 0)).unwrap().unwrap();
    assert_eq!(handle.finished().await, RunState::TimedOut);
    assert!(controller.coupons().is_empty());
}

#[tokio::test(start_paused = true)]
async fn late_inputs_within_timeout_start_sampling() {
    let model = StaticModel::full_range(DrawType::MiniLotto).with_delay(Duration::from_millis(800));
    let controller = CouponController::for_draw_type(Arc::new(model), DrawType::MiniLotto);

    let mut handle = controller.start(request(3, 0)).unwrap().unwrap();
    sleep(Duration::from_millis(500)).await;
    assert_eq!(handle.state(), RunState::AwaitingModelData);

    assert_eq!(handle.finished().await, RunState::Completed);
    assert_eq!(controller.coupons().len(), 3);
}

#[tokio::test]
async fn not_ready_model_is_a_no_op() {
    let model = StaticModel::full_range(DrawType::Lotto).with_ready(false);
    let controller = CouponController::for_draw_type(Arc::new(model), DrawType::Lotto);

    assert!(controller.start(request(3, 0)).unwrap().is_none());
    assert_eq!(*controller.state().borrow(), RunState::Idle);
    assert_eq!(*controller.progress().borrow(), 0.0);
    assert!(!*controller.data_ready().borrow());
    assert!(!controller.is_generating());
}

#[tokio::test]
async fn zero_target_is_rejected() {
    let controller = controller(StaticModel::full_range(DrawType::Lotto), 6);
    assert!(matches!(
        controller.start(request(0, 0)),
        Err(Error::InvalidRequest { .. })
    ));
    assert!(!controller.is_generating());
}

#[tokio::test]
async fn zero_numbers_per_coupon_is_rejected() {
    let controller = controller(StaticModel::full_range(DrawType::Lotto), 0);
    assert!(matches!(
        controller.start(request(1, 0)),
        Err(Error::InvalidRequest { .. })
    ));
    assert!(!controller.is_generating());
    assert!(controller.coupons().is_empty());
    assert_eq!(*controller.state().borrow(), RunState::Idle);
}

#[tokio::test(start_paused = true)]
async fn cancel_is_idempotent_and_final() {
    let controller = controller(StaticModel::full_range(DrawType::Lotto), 6);

    let mut handle = controller.start(request(1_000, 0)).unwrap().unwrap();
    sleep(Duration::from_millis(520)).await;
    assert!(!controller.coupons().is_empty());
    assert!(*controller.progress().borrow() > 0.0);

    controller.cancel();
    let once = (*controller.progress().borrow(), controller.coupons(), *controller.state().borrow());
    controller.cancel();
    let twice = (*controller.progress().borrow(), controller.coupons(), *controller.state().borrow());

    assert_eq!(once, twice);
    assert_eq!(once, (0.0, Vec::new(), RunState::Cancelled));
    assert_eq!(handle.finished().await, RunState::Cancelled);
    assert!(handle.is_cancelled());

    // Nothing from the cancelled run shows up later.
    sleep(Duration::from_secs(2)).await;
    assert!(controller.coupons().is_empty());
    assert_eq!(*controller.progress().borrow(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_awaiting_model_data() {
    let model = StaticModel::full_range(DrawType::Lotto).with_delay(Duration::from_millis(300));
    let controller = CouponController::for_draw_type(Arc::new(model), DrawType::Lotto);

    let handle = controller.start(request(2, 0)).unwrap().unwrap();
    sleep(Duration::from_millis(100)).await;
    controller.cancel();

    sleep(Duration::from_secs(2)).await;
    assert_eq!(handle.state(), RunState::Cancelled);
    assert!(controller.coupons().is_empty());
    assert_eq!(*controller.progress().borrow(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn accepted_coupons_respect_exclusion_and_distance() {
    let excluded: ExclusionSet = (1..=10).collect();
    let model = StaticModel::full_range(DrawType::Lotto).with_exclusion(excluded.clone());
    let controller = CouponController::for_draw_type(Arc::new(model), DrawType::Lotto);

    let mut handle = controller.start(request(20, 2)).unwrap().unwrap();
    assert_eq!(handle.finished().await, RunState::Completed);

    let coupons = controller.coupons();
    assert_eq!(coupons.len(), 20);
    for (i, coupon) in coupons.iter().enumerate() {
        assert_eq!(coupon.len(), 6);
        assert!(coupon.values().windows(2).all(|w| w[0] < w[1]));
        assert!(coupon.values().iter().all(|v| !excluded.contains(v)));

        let set = coupon.to_set();
        for earlier in &coupons[..i] {
            let new_values = set.difference(&earlier.to_set()).count();
            assert!(new_values > 2, "{coupon} too close to {earlier}");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn out_of_scope_coupons_are_dropped() {
    let model = StaticModel::full_range(DrawType::MiniLotto)
        .with_scope(|values| values.iter().all(|v| v % 2 == 0));
    let controller = CouponController::for_draw_type(Arc::new(model), DrawType::MiniLotto);

    let mut handle = controller.start(request(3, 0)).unwrap().unwrap();
    assert_eq!(handle.finished().await, RunState::Completed);
    assert!(
        controller
            .coupons()
            .iter()
            .all(|c| c.values().iter().all(|v| v % 2 == 0))
    );
}

#[tokio::test(start_paused = true)]
async fn progress_tracks_accepted_count() {
    let controller = controller(StaticModel::full_range(DrawType::Lotto), 6);
    let mut progress = controller.progress();
    let results = controller.results();

    let mut handle = controller.start(request(4, 0)).unwrap().unwrap();

    let mut seen = Vec::new();
    while progress.changed().await.is_ok() {
        let value = *progress.borrow_and_update();
        seen.push(value);
        if value >= 1.0 {
            break;
        }
    }
    assert_eq!(handle.finished().await, RunState::Completed);
    assert_eq!(seen.last(), Some(&1.0));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
    assert_eq!(results.borrow().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn exhausted_pool_stalls_until_cancelled() {
    let model = StaticModel::new(pools(&[&[1, 2, 3], &[4, 5]]), [4, 5].into());
    let controller = controller(model, 2);

    let handle = controller.start(request(1, 0)).unwrap().unwrap();
    sleep(Duration::from_secs(60)).await;

    // The input timeout does not cover sampling.
    assert_eq!(handle.state(), RunState::Sampling);
    assert_eq!(*controller.progress().borrow(), 0.0);
    assert!(controller.is_generating());

    handle.cancel();
    assert_eq!(handle.state(), RunState::Cancelled);
    assert!(!controller.is_generating());
}

#[tokio::test(start_paused = true)]
async fn restart_cancels_previous_run_and_resets_results() {
    let controller = controller(StaticModel::full_range(DrawType::Lotto), 6);

    let mut first = controller.start(request(1_000, 0)).unwrap().unwrap();
    sleep(Duration::from_millis(300)).await;
    assert!(!controller.coupons().is_empty());

    let mut second = controller.start(request(2, 0)).unwrap().unwrap();
    assert_eq!(first.finished().await, RunState::Cancelled);
    assert!(controller.coupons().is_empty());
    assert_eq!(*controller.progress().borrow(), 0.0);

    // A stale handle cannot cancel the new run.
    first.cancel();
    assert_eq!(second.finished().await, RunState::Completed);
    assert_eq!(controller.coupons().len(), 2);
    assert_ne!(first.id(), second.id());
}

#[tokio::test(start_paused = true)]
async fn clear_coupons_keeps_progress() {
    let controller = controller(StaticModel::full_range(DrawType::Lotto), 6);

    let mut handle = controller.start(request(2, 0)).unwrap().unwrap();
    handle.finished().await;
    controller.clear_coupons();

    assert!(controller.coupons().is_empty());
    assert_eq!(*controller.progress().borrow(), 1.0);
}

#[tokio::test(start_paused = true)]
async fn cleared_completed_run_still_reads_as_complete() {
    let controller = controller(StaticModel::full_range(DrawType::Lotto), 6);

    let mut handle = controller.start(request(2, 0)).unwrap().unwrap();
    assert_eq!(handle.finished().await, RunState::Completed);
    controller.clear_coupons();

    assert_eq!(*controller.state().borrow(), RunState::Completed);
    assert_eq!(controller.progress_status(), Progress::Fraction(1.0));
}

#[tokio::test(start_paused = true)]
async fn nothing_is_appended_after_completion() {
    let controller = controller(StaticModel::full_range(DrawType::Lotto), 6);

    let mut handle = controller.start(request(3, 0)).unwrap().unwrap();
    assert_eq!(handle.finished().await, RunState::Completed);
    let completed = controller.coupons();
    assert_eq!(completed.len(), 3);

    sleep(Duration::from_secs(5)).await;

    assert_eq!(controller.coupons(), completed);
    assert_eq!(*controller.progress().borrow(), 1.0);
    assert_eq!(handle.state(), RunState::Completed);
    assert!(!controller.is_generating());
}

#[tokio::test(start_paused = true)]
async fn dropping_controller_cancels_run() {
    let controller = controller(StaticModel::full_range(DrawType::Lotto), 6);

    let mut handle = controller.start(request(1_000, 0)).unwrap().unwrap();
    sleep(Duration::from_millis(200)).await;
    drop(controller);

    assert_eq!(handle.finished().await, RunState::Cancelled);
}
