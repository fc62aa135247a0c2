//! Turns UI events into rule changes, sound requests and an up-to-date view model.

use crate::audio::{SoundBoard, SoundEffect, SoundSink};
use crate::game::{GameState, MoveOutcome, Player, RoundResult, CELL_COUNT};

pub const TITLE: &str = "tateti";

/// Everything the window shows. Kept in step with the game state by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pub title: &'static str,
    pub title_highlighted: bool,
    pub current_player: Player,
    pub status: String,
    pub score_x: String,
    pub score_o: String,
    pub cells: [CellView; CELL_COUNT],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellView {
    pub mark: Option<Player>,
    pub winning: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            title: TITLE,
            title_highlighted: false,
            current_player: Player::X,
            status: String::new(),
            score_x: "0".to_string(),
            score_o: "0".to_string(),
            cells: [CellView::default(); CELL_COUNT],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CellPressed(usize),
    CellHoverEnter(usize),
    CellHoverExit(usize),
    ResetRound,
    NewGame,
    TitleClicked,
    /// Any click, key press or touch anywhere in the window.
    UserInteraction,
}

pub struct GameController<S> {
    game: GameState,
    sounds: SoundBoard<S>,
    display: Display,
}

impl<S: SoundSink> GameController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            game: GameState::new(),
            sounds: SoundBoard::new(sink),
            display: Display::default(),
        }
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::CellPressed(index) => self.press_cell(index),
            Command::CellHoverEnter(_) => self.sounds.request(SoundEffect::CellHoverEnter),
            Command::CellHoverExit(_) => self.sounds.request(SoundEffect::CellHoverExit),
            Command::ResetRound => self.reset_round(),
            Command::NewGame => self.new_game(),
            Command::TitleClicked => {
                self.display.title_highlighted = !self.display.title_highlighted;
            }
            Command::UserInteraction => {
                self.sounds.unlock();
            }
        }
    }

    fn press_cell(&mut self, index: usize) {
        if let Err(err) = self.game.check_move(index) {
            tracing::trace!(index, "ignoring move: {err}");
            return;
        }
        self.sounds.request(SoundEffect::CellPress);

        let player = self.game.current_player();
        let outcome = match self.game.play(index) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::trace!(index, "ignoring move: {err}");
                return;
            }
        };
        self.display.cells[index].mark = Some(player);

        match outcome {
            MoveOutcome::Continue { next } => {
                self.display.current_player = next;
            }
            MoveOutcome::Ended(RoundResult::Won { player, line }) => {
                for i in line {
                    self.display.cells[i].winning = true;
                }
                tracing::info!(winner = player.symbol(), ?line, "round won");
                self.sounds.request(SoundEffect::RoundWon);
                self.display.status = format!("{} wins!", player.symbol());
                self.sync_scores();
            }
            MoveOutcome::Ended(RoundResult::Draw) => {
                tracing::info!("round drawn");
                self.display.status = "Draw!".to_string();
                self.sync_scores();
            }
        }
    }

    fn reset_round(&mut self) {
        self.sounds.request(SoundEffect::Reset);
        self.game.reset_round();
        self.display.cells = [CellView::default(); CELL_COUNT];
        self.display.current_player = self.game.current_player();
        self.display.status.clear();
    }

    fn new_game(&mut self) {
        self.sounds.request(SoundEffect::Reset);
        self.reset_round();
        self.game.new_game();
        self.sync_scores();
        tracing::debug!("new game");
    }

    fn sync_scores(&mut self) {
        let scores = self.game.scores();
        self.display.score_x = scores.get(Player::X).to_string();
        self.display.score_o = scores.get(Player::O).to_string();
    }

    pub fn audio_unlocked(&self) -> bool {
        self.sounds.is_unlocked()
    }

    #[cfg(test)]
    fn game(&self) -> &GameState {
        &self.game
    }

    #[cfg(test)]
    fn sounds(&self) -> &SoundBoard<S> {
        &self.sounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::RecordingSink;
    use crate::game::Board;

    fn controller() -> GameController<RecordingSink> {
        GameController::new(RecordingSink::default())
    }

    fn unlocked() -> GameController<RecordingSink> {
        let mut c = controller();
        c.handle(Command::UserInteraction);
        c
    }

    fn press_all(c: &mut GameController<RecordingSink>, cells: &[usize]) {
        for &i in cells {
            c.handle(Command::CellPressed(i));
        }
    }

    fn played(c: &GameController<RecordingSink>) -> &[SoundEffect] {
        &c.sounds().sink().played
    }

    #[test]
    fn test_display_tracks_moves_and_turns() {
        let mut c = unlocked();
        c.handle(Command::CellPressed(4));
        assert_eq!(c.display().cells[4].mark, Some(Player::X));
        assert_eq!(c.display().current_player, Player::O);

        c.handle(Command::CellPressed(0));
        assert_eq!(c.display().cells[0].mark, Some(Player::O));
        assert_eq!(c.display().current_player, Player::X);
        assert_eq!(
            played(&c),
            &[SoundEffect::CellPress, SoundEffect::CellPress]
        );
    }

    #[test]
    fn test_rejected_press_has_no_effect() {
        let mut c = unlocked();
        c.handle(Command::CellPressed(4));
        let display = c.display().clone();
        let board = *c.game().board();

        c.handle(Command::CellPressed(4));
        c.handle(Command::CellPressed(42));
        assert_eq!(*c.display(), display);
        assert_eq!(*c.game().board(), board);
        assert_eq!(played(&c), &[SoundEffect::CellPress]);
    }

    #[test]
    fn test_win_highlights_line_and_scores() {
        let mut c = unlocked();
        press_all(&mut c, &[0, 4, 1, 5, 2]);

        assert!(!c.game().is_active());
        assert_eq!(c.display().score_x, "1");
        assert_eq!(c.display().score_o, "0");
        assert_eq!(c.display().status, "X wins!");
        // The turn label stays on the winner.
        assert_eq!(c.display().current_player, Player::X);
        let winning: Vec<usize> = (0..CELL_COUNT)
            .filter(|&i| c.display().cells[i].winning)
            .collect();
        assert_eq!(winning, vec![0, 1, 2]);
        assert_eq!(played(&c).last(), Some(&SoundEffect::RoundWon));

        // Further presses do nothing, not even a sound.
        let sounds = played(&c).len();
        c.handle(Command::CellPressed(8));
        assert_eq!(c.display().cells[8].mark, None);
        assert_eq!(played(&c).len(), sounds);
    }

    #[test]
    fn test_draw_changes_no_score() {
        let mut c = unlocked();
        press_all(&mut c, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);

        assert!(!c.game().is_active());
        assert_eq!(c.display().status, "Draw!");
        assert_eq!(c.display().score_x, "0");
        assert_eq!(c.display().score_o, "0");
        assert!(c.display().cells.iter().all(|cell| !cell.winning));
        assert!(!played(&c).contains(&SoundEffect::RoundWon));
    }

    #[test]
    fn test_reset_round_keeps_scores() {
        let mut c = unlocked();
        press_all(&mut c, &[0, 4, 1, 5, 2]);
        c.handle(Command::ResetRound);

        assert_eq!(*c.game().board(), Board::default());
        assert!(c.game().is_active());
        assert_eq!(c.game().current_player(), Player::X);
        assert_eq!(c.game().scores().get(Player::X), 1);
        assert_eq!(c.display().score_x, "1");
        assert_eq!(c.display().status, "");
        assert_eq!(c.display().cells, [CellView::default(); CELL_COUNT]);
        assert_eq!(played(&c).last(), Some(&SoundEffect::Reset));
    }

    #[test]
    fn test_new_game_from_any_state() {
        let mut c = unlocked();
        press_all(&mut c, &[0, 4, 1, 5, 2]);
        c.handle(Command::ResetRound);
        press_all(&mut c, &[3, 0]);

        c.handle(Command::NewGame);
        assert_eq!(*c.game().board(), Board::default());
        assert_eq!(c.game().current_player(), Player::X);
        assert!(c.game().is_active());
        assert_eq!(c.game().scores().get(Player::X), 0);
        assert_eq!(c.game().scores().get(Player::O), 0);
        assert_eq!(*c.display(), Display::default());
    }

    #[test]
    fn test_reset_sounds_play_while_round_is_live() {
        let mut c = unlocked();
        c.handle(Command::ResetRound);
        c.handle(Command::NewGame);
        assert_eq!(
            played(&c),
            &[SoundEffect::Reset, SoundEffect::Reset, SoundEffect::Reset]
        );
    }

    #[test]
    fn test_nothing_plays_before_first_interaction() {
        let mut c = controller();
        c.handle(Command::CellHoverEnter(0));
        c.handle(Command::CellPressed(0));
        c.handle(Command::CellHoverExit(0));
        assert_eq!(c.game().board().get(0), Some(Player::X));
        assert_eq!(c.display().cells[0].mark, Some(Player::X));
        c.handle(Command::ResetRound);
        assert!(played(&c).is_empty());

        c.handle(Command::UserInteraction);
        c.handle(Command::CellHoverEnter(3));
        c.handle(Command::CellHoverExit(3));
        assert_eq!(
            played(&c),
            &[SoundEffect::CellHoverEnter, SoundEffect::CellHoverExit]
        );
    }

    #[test]
    fn test_repeated_interaction_unlocks_once() {
        let mut c = controller();
        c.handle(Command::UserInteraction);
        c.handle(Command::UserInteraction);
        assert_eq!(c.sounds().sink().primed, SoundEffect::ALL.to_vec());
    }

    #[test]
    fn test_title_click_toggles_highlight() {
        let mut c = controller();
        assert_eq!(c.display().title, "tateti");
        c.handle(Command::TitleClicked);
        assert!(c.display().title_highlighted);
        c.handle(Command::TitleClicked);
        assert!(!c.display().title_highlighted);
    }
}
