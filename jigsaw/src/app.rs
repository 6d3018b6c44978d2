use std::time::Duration;

use engine::app::{AppContext, GameApp, InputFrame};
use engine::graphics::Renderer2d;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::edge::EdgeLibrary;
use crate::geom::Point;
use crate::puzzle::PuzzleConfig;
use crate::session::{PictureEntry, Session};
use crate::sfx::{Sfx, SoundEvent};

/// Windowed front end: feeds polled input into a `Session` and plays the sounds it reports.
pub struct JigsawApp {
    pictures: Vec<PictureEntry>,
    library: EdgeLibrary,
    config: PuzzleConfig,
    seed: u64,
    sfx: Option<Sfx>,
}

impl JigsawApp {
    pub fn new(
        pictures: Vec<PictureEntry>,
        library: EdgeLibrary,
        config: PuzzleConfig,
        seed: u64,
        sfx: Option<Sfx>,
    ) -> Self {
        Self {
            pictures,
            library,
            config,
            seed,
            sfx,
        }
    }
}

/// Applies one frame of input to `session`, in the order pointer move, click, keys.
pub fn apply_input(session: &mut Session, input: &InputFrame) -> Vec<SoundEvent> {
    let mut sounds = Vec::new();
    if let Some(pos) = input.mouse_pos {
        session.pointer_moved(Point::from(pos));
        if input.mouse_down {
            sounds.extend(session.pointer_down(Point::from(pos)));
        }
    }
    for &ch in &input.typed {
        sounds.extend(session.key_press(ch));
    }
    sounds
}

impl GameApp for JigsawApp {
    type State = Session;
    type Effect = SoundEvent;

    fn init_state(&mut self, ctx: &mut AppContext) -> Self::State {
        let mut session = Session::new(
            self.pictures.clone(),
            self.library.clone(),
            self.config.clone(),
            ChaCha8Rng::seed_from_u64(self.seed),
        );
        session.resize(ctx.surface_size);
        session
    }

    fn update_state(
        &mut self,
        state: &mut Self::State,
        input: &InputFrame,
        _dt: Duration,
        ctx: &mut AppContext,
    ) -> Vec<Self::Effect> {
        state.resize(ctx.surface_size);
        apply_input(state, input)
    }

    fn render(&mut self, state: &Self::State, renderer: &mut dyn Renderer2d) {
        state.render(renderer);
    }

    fn handle_effects(&mut self, effects: Vec<Self::Effect>, _ctx: &mut AppContext) {
        let Some(sfx) = &self.sfx else {
            return;
        };
        for effect in effects {
            sfx.play(effect);
        }
    }
}
