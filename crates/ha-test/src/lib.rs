//! ha-test: deterministic fake Atari for exercising ha-core
//!
//! `FakeAtari` keeps 128 bytes of RAM and draws rectangular sprites whose
//! position, color and motion are read from RAM cells, so every pixel has a
//! known set of causative addresses. The layouts mirror the cells the real
//! games use.

use ha_core::consts::{
    CAR_COLOR_START, CAR_DEFAULT_COLORS, CAR_FREEZE_VALUE, CAR_MOTION_START, LASER_X, RAM_SIZE,
    SCREEN_HEIGHT, SCREEN_WIDTH,
};
use ha_core::{Action, Address, Emulator, MemoryView, Rgb, ScreenBuffer, StepInfo, StepResult};
use serde::{Deserialize, Serialize};

/// Incremented every frame; never drawn
pub const FRAME_COUNTER: Address = 127;

/// Moves the player right
pub const ACTION_RIGHT: Action = Action(2);
/// Moves the player left
pub const ACTION_LEFT: Action = Action(3);

/// Player x position that scores a point
pub const GOAL_X: u8 = 150;

/// Rectangle drawn from RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub x_addr: Address,
    pub y: usize,
    pub color_addr: Address,
    /// Cell that stops the sprite when it holds the freeze value
    pub motion_addr: Option<Address>,
    pub width: usize,
    pub height: usize,
}

impl Sprite {
    pub fn covers(&self, ram: &[u8], x: usize, y: usize) -> bool {
        let left = usize::from(ram[self.x_addr]);
        (left..left + self.width).contains(&x) && (self.y..self.y + self.height).contains(&y)
    }
}

/// Full machine state, as returned by `clone_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakeState {
    pub ram: Vec<u8>,
    pub frame_number: u64,
    pub episode_frame_number: u64,
}

#[derive(Debug, Clone)]
pub struct FakeAtari {
    ram: Vec<u8>,
    initial_ram: Vec<u8>,
    sprites: Vec<Sprite>,
    /// Index into `sprites` of the sprite moved by actions
    player: Option<usize>,
    screen: ScreenBuffer,
    frame_number: u64,
    episode_frame_number: u64,
    episode_length: u64,
    /// Cell that ignores writes from outside
    locked: Option<Address>,
}

/// Grayscale palette; 0 is the black background.
pub fn palette(color: u8) -> Rgb {
    Rgb([color, color, color])
}

impl FakeAtari {
    pub fn new(initial_ram: Vec<u8>, sprites: Vec<Sprite>, player: Option<usize>) -> Self {
        let mut atari = Self {
            ram: initial_ram.clone(),
            initial_ram,
            sprites,
            player,
            screen: ScreenBuffer::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            frame_number: 0,
            episode_frame_number: 0,
            episode_length: 1000,
            locked: None,
        };
        atari.render();
        atari
    }

    /// Ten cars on their lanes plus a player at the bottom.
    pub fn freeway() -> Self {
        let mut ram = vec![0u8; RAM_SIZE];
        let mut sprites = Vec::new();
        for car in 0..10 {
            let x_addr = 108 + car;
            ram[x_addr] = 10 + 14 * car as u8;
            ram[CAR_COLOR_START + car] = CAR_DEFAULT_COLORS[car];
            sprites.push(Sprite {
                x_addr,
                y: 20 + 18 * car,
                color_addr: CAR_COLOR_START + car,
                motion_addr: Some(CAR_MOTION_START + car),
                width: 8,
                height: 8,
            });
        }
        ram[14] = 20;
        ram[15] = 30;
        sprites.push(Sprite {
            x_addr: 14,
            y: 195,
            color_addr: 15,
            motion_addr: None,
            width: 6,
            height: 6,
        });
        Self::new(ram, sprites, Some(10))
    }

    /// A laser shot and the player's cannon.
    pub fn space_invaders() -> Self {
        let mut ram = vec![0u8; RAM_SIZE];
        ram[LASER_X] = 100;
        ram[88] = 200;
        ram[28] = 60;
        ram[29] = 90;
        let sprites = vec![
            Sprite {
                x_addr: LASER_X,
                y: 100,
                color_addr: 88,
                motion_addr: None,
                width: 1,
                height: 10,
            },
            Sprite {
                x_addr: 28,
                y: 185,
                color_addr: 29,
                motion_addr: None,
                width: 8,
                height: 6,
            },
        ];
        Self::new(ram, sprites, Some(1))
    }

    /// End each episode after `frames` frames.
    pub fn with_episode_length(mut self, frames: u64) -> Self {
        self.episode_length = frames;
        self
    }

    /// Make `address` ignore writes, as a misbehaving emulator would.
    pub fn with_locked_cell(mut self, address: Address) -> Self {
        self.locked = Some(address);
        self
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Topmost sprite covering (x, y) in the current RAM
    pub fn sprite_at(&self, x: usize, y: usize) -> Option<&Sprite> {
        self.sprites.iter().rev().find(|s| s.covers(&self.ram, x, y))
    }

    fn render(&mut self) {
        self.screen.fill(Rgb::BLACK);
        for sprite in &self.sprites {
            let color = palette(self.ram[sprite.color_addr]);
            let left = usize::from(self.ram[sprite.x_addr]);
            for y in sprite.y..sprite.y + sprite.height {
                for x in left..left + sprite.width {
                    self.screen.set_pixel(x, y, color);
                }
            }
        }
    }

    fn move_player(&mut self, action: Action) -> f64 {
        let Some(player) = self.player else {
            return 0.0;
        };
        let x_addr = self.sprites[player].x_addr;
        let x = self.ram[x_addr];
        self.ram[x_addr] = match action {
            ACTION_RIGHT => x.saturating_add(2),
            ACTION_LEFT => x.saturating_sub(2),
            _ => x,
        };
        if self.ram[x_addr] >= GOAL_X {
            self.ram[x_addr] = 10;
            return 1.0;
        }
        0.0
    }
}

impl MemoryView for FakeAtari {
    fn memory(&self) -> &[u8] {
        &self.ram
    }

    fn write_byte(&mut self, address: Address, value: u8) {
        if self.locked == Some(address) {
            return;
        }
        if let Some(cell) = self.ram.get_mut(address) {
            *cell = value;
        }
    }
}

impl Emulator for FakeAtari {
    type Observation = Vec<u8>;
    type State = FakeState;

    fn step(&mut self, action: Action) -> StepResult<Vec<u8>> {
        self.ram[FRAME_COUNTER] = self.ram[FRAME_COUNTER].wrapping_add(1);
        let reward = self.move_player(action);

        for sprite in &self.sprites {
            if let Some(motion) = sprite.motion_addr
                && self.ram[motion] != CAR_FREEZE_VALUE
            {
                let x = usize::from(self.ram[sprite.x_addr]);
                self.ram[sprite.x_addr] = ((x + 1) % SCREEN_WIDTH) as u8;
            }
        }

        self.render();
        self.frame_number += 1;
        self.episode_frame_number += 1;

        StepResult {
            observation: self.ram.clone(),
            reward,
            terminated: self.episode_frame_number >= self.episode_length,
            truncated: false,
            info: StepInfo {
                frame_number: self.frame_number,
                episode_frame_number: self.episode_frame_number,
            },
        }
    }

    fn screen_rgb(&self) -> ScreenBuffer {
        self.screen.clone()
    }

    fn screen_size(&self) -> (usize, usize) {
        (self.screen.width(), self.screen.height())
    }

    fn reset(&mut self) -> Vec<u8> {
        self.ram = self.initial_ram.clone();
        self.episode_frame_number = 0;
        self.render();
        self.ram.clone()
    }

    fn clone_state(&self) -> FakeState {
        FakeState {
            ram: self.ram.clone(),
            frame_number: self.frame_number,
            episode_frame_number: self.episode_frame_number,
        }
    }

    fn restore_state(&mut self, state: &FakeState) {
        self.ram = state.ram.clone();
        self.frame_number = state.frame_number;
        self.episode_frame_number = state.episode_frame_number;
        self.render();
    }
}
