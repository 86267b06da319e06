use std::io::{self, Write};
use std::sync::Mutex;

pub trait Progress: Send + Sync {
    fn start(&self, _label: &str, _total: usize) {}
    fn advance(&self, increment: usize);
    fn finish(&self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&self, _increment: usize) {}
}

const BAR_WIDTH: usize = 40;

#[derive(Debug, Default)]
struct BarState {
    label: String,
    total: usize,
    done: usize,
}

#[derive(Debug, Default)]
pub struct ConsoleProgress {
    state: Mutex<BarState>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn draw(state: &BarState) {
        let line = render_bar(&state.label, state.done, state.total);
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r{}", line);
        let _ = stderr.flush();
    }
}

impl Progress for ConsoleProgress {
    fn start(&self, label: &str, total: usize) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        *state = BarState {
            label: label.to_string(),
            total,
            done: 0,
        };
        Self::draw(&state);
    }

    fn advance(&self, increment: usize) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.done = (state.done + increment).min(state.total);
        Self::draw(&state);
    }

    fn finish(&self) {
        let _ = writeln!(io::stderr());
    }
}

fn render_bar(label: &str, done: usize, total: usize) -> String {
    let filled = if total == 0 {
        BAR_WIDTH
    } else {
        done * BAR_WIDTH / total
    };
    let mut bar = "=".repeat(filled);
    if filled < BAR_WIDTH {
        bar.push('>');
        bar.push_str(&" ".repeat(BAR_WIDTH - filled - 1));
    }
    format!("{} [{}] {}/{}", label, bar, done, total)
}
