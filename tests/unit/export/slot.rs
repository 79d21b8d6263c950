use super::*;

#[test]
fn second_acquire_is_busy_until_release() {
    let slot = ExportSlot::new();
    assert!(!slot.is_busy());

    let guard = slot.try_acquire().unwrap();
    assert!(slot.is_busy());
    assert!(matches!(slot.try_acquire().unwrap_err(), ReelError::Busy));

    drop(guard);
    assert!(!slot.is_busy());
    assert!(slot.try_acquire().is_ok());
}

#[test]
fn clones_share_the_slot_across_threads() {
    let slot = ExportSlot::new();
    let guard = slot.try_acquire().unwrap();

    let view = slot.clone();
    let busy = std::thread::spawn(move || (view.is_busy(), view.try_acquire().is_err()))
        .join()
        .unwrap();
    assert_eq!(busy, (true, true));

    drop(guard);
    assert!(!slot.is_busy());
}

#[test]
fn independent_slots_do_not_interfere() {
    let a = ExportSlot::new();
    let b = ExportSlot::new();
    let _ga = a.try_acquire().unwrap();
    assert!(b.try_acquire().is_ok());
}
