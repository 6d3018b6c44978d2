use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameView {
    #[default]
    Menu,
    Playing,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameViewEvent {
    SelectPuzzle,
    Completed,
    Restart,
    Abandon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameViewEffect {
    None,
    BuildPuzzle,
    DiscardPuzzle,
}

impl GameView {
    /// Pure transition function for the menu / playing / won cycle.
    ///
    /// Building and discarding the puzzle are reported as effects so the session decides when
    /// to spend the work and tests can check transitions without a picture.
    pub fn handle(self, event: GameViewEvent) -> (GameView, GameViewEffect) {
        match (self, event) {
            (GameView::Menu, GameViewEvent::SelectPuzzle) => {
                (GameView::Playing, GameViewEffect::BuildPuzzle)
            }
            (GameView::Playing, GameViewEvent::Completed) => (GameView::Won, GameViewEffect::None),
            (GameView::Playing, GameViewEvent::Abandon) => {
                (GameView::Menu, GameViewEffect::DiscardPuzzle)
            }
            (GameView::Won, GameViewEvent::Restart) => {
                (GameView::Menu, GameViewEffect::DiscardPuzzle)
            }

            // Ignore irrelevant events in the current state.
            (state, _) => (state, GameViewEffect::None),
        }
    }

    pub fn is_playing(self) -> bool {
        self == GameView::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_is_menu() {
        assert_eq!(GameView::default(), GameView::Menu);
    }

    #[test]
    fn selecting_from_menu_builds_puzzle() {
        assert_eq!(
            GameView::Menu.handle(GameViewEvent::SelectPuzzle),
            (GameView::Playing, GameViewEffect::BuildPuzzle)
        );
    }

    #[test]
    fn completing_enters_won_and_keeps_puzzle() {
        assert_eq!(
            GameView::Playing.handle(GameViewEvent::Completed),
            (GameView::Won, GameViewEffect::None)
        );
    }

    #[test]
    fn restart_and_abandon_return_to_menu_and_discard() {
        assert_eq!(
            GameView::Won.handle(GameViewEvent::Restart),
            (GameView::Menu, GameViewEffect::DiscardPuzzle)
        );
        assert_eq!(
            GameView::Playing.handle(GameViewEvent::Abandon),
            (GameView::Menu, GameViewEffect::DiscardPuzzle)
        );
    }

    #[test]
    fn irrelevant_events_are_ignored() {
        for (view, event) in [
            (GameView::Menu, GameViewEvent::Completed),
            (GameView::Menu, GameViewEvent::Restart),
            (GameView::Menu, GameViewEvent::Abandon),
            (GameView::Playing, GameViewEvent::SelectPuzzle),
            (GameView::Playing, GameViewEvent::Restart),
            (GameView::Won, GameViewEvent::SelectPuzzle),
            (GameView::Won, GameViewEvent::Completed),
            (GameView::Won, GameViewEvent::Abandon),
        ] {
            assert_eq!(view.handle(event), (view, GameViewEffect::None));
        }
    }
}
