//! Page visibility handling

use super::driver::LoopDriver;
use super::input::InputAdapter;
use crate::settings::Settings;
use crate::sim::GamePhase;

/// Page shown or hidden. Ticking stops while hidden; with `pause_on_hidden`
/// a running game also gets a pause intent, taken by the first tick back.
///
/// Returns true when a pause was requested.
pub fn on_visibility_change(
    hidden: bool,
    driver: &mut LoopDriver,
    input: &mut InputAdapter,
    phase: GamePhase,
    settings: &Settings,
) -> bool {
    driver.set_visible(!hidden);
    if hidden && settings.pause_on_hidden && phase == GamePhase::Running {
        input.request_pause();
        log::info!("Auto-paused (page hidden)");
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::runner::{Runner, RunnerTuning};
    use crate::sim::{Minigame, TickInput, tick};

    fn running_runner() -> Runner {
        let mut game = Runner::with_tuning(
            2,
            RunnerTuning {
                spawn_probability: 0.0,
                ..Default::default()
            },
        );
        let mut events = Vec::new();
        tick(
            &mut game,
            &TickInput {
                primary: true,
                ..Default::default()
            },
            &mut events,
        );
        game
    }

    /// Drive one animation frame the way the web loop does
    fn frame(now_ms: f64, driver: &mut LoopDriver, input: &mut InputAdapter, game: &mut Runner) -> u32 {
        let mut events = Vec::new();
        let ticks = driver.advance(now_ms);
        for _ in 0..ticks {
            tick(game, &input.take_tick_input(), &mut events);
        }
        ticks
    }

    #[test]
    fn test_hidden_page_pauses_on_first_tick_back() {
        let mut game = running_runner();
        let mut driver = LoopDriver::new();
        let mut input = InputAdapter::new();
        let settings = Settings::default();

        frame(0.0, &mut driver, &mut input, &mut game);
        frame(1000.0 / 60.0, &mut driver, &mut input, &mut game);
        let frames = game.frames();

        assert!(on_visibility_change(true, &mut driver, &mut input, game.phase(), &settings));
        assert_eq!(frame(30_000.0, &mut driver, &mut input, &mut game), 0);
        assert_eq!(game.frames(), frames);
        assert_eq!(game.phase(), GamePhase::Running);

        assert!(!on_visibility_change(false, &mut driver, &mut input, game.phase(), &settings));
        // One tick, no catch-up, and that tick is the pause
        assert_eq!(frame(90_000.0, &mut driver, &mut input, &mut game), 1);
        assert_eq!(game.phase(), GamePhase::Paused);
        assert_eq!(game.frames(), frames);

        // Stays paused afterwards
        frame(90_000.0 + 500.0, &mut driver, &mut input, &mut game);
        assert_eq!(game.phase(), GamePhase::Paused);
        assert_eq!(game.frames(), frames);
    }

    #[test]
    fn test_no_pause_when_disabled_or_idle() {
        let mut driver = LoopDriver::new();
        let mut input = InputAdapter::new();
        let off = Settings {
            pause_on_hidden: false,
            ..Default::default()
        };
        assert!(!on_visibility_change(true, &mut driver, &mut input, GamePhase::Running, &off));
        assert!(!on_visibility_change(true, &mut driver, &mut input, GamePhase::Idle, &Settings::default()));
        assert!(!input.take_tick_input().pause);
        assert!(!driver.is_visible());
    }
}
