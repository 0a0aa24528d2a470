#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Input {
    KeyUp(Key),
    KeyDown(Key),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    LeftShift,
    Left,
    Right,
    Up,
    Down,
}

/// The set of currently held keys, fed by key up/down events
#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: Vec<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, input: Input) {
        match input {
            Input::KeyDown(key) => {
                if !self.pressed_keys.contains(&key) {
                    self.pressed_keys.push(key);
                }
            }
            Input::KeyUp(key) => {
                self.pressed_keys.retain(|&pressed| pressed != key);
            }
        }
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }
}
