//! Scripted game-loop demo: title, play and results with a carried score,
//! a global settings mode and a "back" transition.
//!
//! Real input polling is replaced by a scripted key-per-frame queue so the
//! demo runs headless: `cargo run --example game_loop`.

use playstate::{Condition, ContextState, State, StateFactory, StateMachine};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// One "pressed key" per frame, standing in for real input polling.
#[derive(Clone, Default)]
struct Input {
    frames: Rc<RefCell<VecDeque<&'static str>>>,
    current: Rc<RefCell<Option<&'static str>>>,
}

impl Input {
    fn script(keys: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            frames: Rc::new(RefCell::new(keys.into_iter().collect())),
            current: Rc::new(RefCell::new(None)),
        }
    }

    /// Advance to the next scripted frame. False once the script runs out.
    fn advance(&self) -> bool {
        let next = self.frames.borrow_mut().pop_front();
        let live = next.is_some();
        *self.current.borrow_mut() = next;
        live
    }

    fn pressed(&self, key: &'static str) -> impl Fn() -> bool + 'static {
        let current = Rc::clone(&self.current);
        move || *current.borrow() == Some(key)
    }
}

struct Title;

impl State for Title {
    fn on_enter(&mut self) {
        println!("== title screen ==");
    }
}

struct InGame {
    score: Rc<Cell<i32>>,
}

impl State for InGame {
    fn on_enter(&mut self) {
        self.score.set(0);
        println!("== game on ==");
    }

    fn on_update(&mut self) {
        self.score.set(self.score.get() + 10);
        println!("   playing... score {}", self.score.get());
    }
}

#[derive(Default)]
struct Results {
    score: Option<i32>,
}

impl State for Results {
    fn on_enter(&mut self) {
        println!("== results: final score {} ==", self.score.unwrap_or(0));
    }
}

impl ContextState for Results {
    type Context = i32;

    fn set_context(&mut self, context: i32) {
        self.score = Some(context);
    }
}

struct Settings;

impl State for Settings {
    fn on_enter(&mut self) {
        println!("== settings ==");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input = Input::script([
        "",      // idle on the title screen
        "esc",   // global transition into settings
        "back",  // back to wherever we came from
        "enter", // start the game
        "",      // play a frame
        "",      // play another frame
        "enter", // cash out into results
        "enter", // and back to the title
    ]);
    let score = Rc::new(Cell::new(0));

    let game_score = Rc::clone(&score);
    let factory = StateFactory::new()
        .register(|| Title)
        .register(move || InGame {
            score: game_score.clone(),
        })
        .register_default::<Results>()
        .register(|| Settings);
    let mut machine = StateMachine::new(factory);

    machine
        .from::<Title>()
        .to::<InGame>()
        .guard(Condition::any([
            Condition::new(input.pressed("enter")),
            Condition::new(input.pressed("click")),
        ]))
        .build()?;

    machine
        .from_any()
        .to::<Settings>()
        .when(input.pressed("esc"))
        .build()?;

    machine
        .from::<Settings>()
        .back()
        .when(input.pressed("back"))
        .build()?;

    let final_score = Rc::clone(&score);
    machine
        .from::<InGame>()
        .to_with_provider::<Results, _>(move || final_score.get())
        .when(input.pressed("enter"))
        .build()?;

    machine
        .from::<Results>()
        .to::<Title>()
        .when(input.pressed("enter"))
        .build()?;

    machine.set_initial_state::<Title>()?;

    while input.advance() {
        machine.update()?;
    }

    println!("{}", machine.to_mermaid());
    Ok(())
}
