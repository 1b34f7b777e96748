use powerpac::systems::{Pause, PauseAction};
use speculoos::prelude::*;

#[test]
fn test_timed_pause_fires_once() {
    let mut pause = Pause::new(false);
    pause.pause_for(1.0, PauseAction::ShowEntities);

    assert_that(&pause.is_timed()).is_true();
    assert_that(&pause.update(0.6)).is_none();
    assert_that(&pause.update(0.6)).is_equal_to(Some(PauseAction::ShowEntities));
    assert_that(&pause.is_paused()).is_false();
    assert_that(&pause.update(10.0)).is_none();
}

#[test]
fn test_rearming_discards_the_old_action() {
    let mut pause = Pause::new(false);
    pause.pause_for(1.0, PauseAction::ShowEntities);
    pause.update(0.9);
    pause.set_pause(true, None, None);

    assert_that(&pause.update(5.0)).is_none();
    assert_that(&pause.is_paused()).is_true();
}

#[test]
fn test_unpausing_cancels_a_timed_pause() {
    let mut pause = Pause::new(false);
    pause.pause_for(3.0, PauseAction::NextLevel);
    pause.set_pause(false, None, None);

    assert_that(&pause.update(3.0)).is_none();
    assert_that(&pause.is_paused()).is_false();
}
