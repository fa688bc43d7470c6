//! Asset collaborator seam.
//!
//! The core never decodes images or audio. It asks an [`AssetLoader`] for
//! opaque handles plus the sheet dimensions it needs to slice animation
//! frames, and treats any failure as fatal.

use std::collections::HashMap;
use std::fmt;

use crate::error::AssetError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u32);

/// A loaded sprite sheet: handle plus pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureInfo {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// Every sound cue the game can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundName {
    PlayerShot,
    EnemyShot,
    EnemyDeath,
    PlayerDeath,
    Win,
    Lose,
}

impl SoundName {
    pub const ALL: [SoundName; 6] = [
        SoundName::PlayerShot,
        SoundName::EnemyShot,
        SoundName::EnemyDeath,
        SoundName::PlayerDeath,
        SoundName::Win,
        SoundName::Lose,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SoundName::PlayerShot => "player-shot.wav",
            SoundName::EnemyShot => "enemy-shot.wav",
            SoundName::EnemyDeath => "enemy-death.wav",
            SoundName::PlayerDeath => "player-death.wav",
            SoundName::Win => "win.wav",
            SoundName::Lose => "lose.wav",
        }
    }

    pub fn path(self) -> String {
        format!("{SOUND_DIR}/{}", self.file_name())
    }
}

impl fmt::Display for SoundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

pub const TEXTURE_DIR: &str = "resources/texture";
pub const SOUND_DIR: &str = "resources/sfx";
pub const FONT_PATH: &str = "resources/font/arcade.ttf";

/// Load-by-path interface the session uses to build entities.
pub trait AssetLoader {
    fn load_texture(&mut self, path: &str) -> Result<TextureInfo, AssetError>;
    fn load_sound(&mut self, path: &str) -> Result<SoundHandle, AssetError>;
    fn load_font(&mut self, path: &str) -> Result<FontHandle, AssetError>;
}

/// In-memory loader: a table of known paths and their sheet sizes.
///
/// Handles are assigned in registration order so equal manifests yield equal
/// handles.
#[derive(Clone, Debug, Default)]
pub struct Manifest {
    textures: HashMap<String, TextureInfo>,
    sounds: HashMap<String, SoundHandle>,
    fonts: HashMap<String, FontHandle>,
    next_handle: u32,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sheets and cues shipped with the game.
    ///
    /// Every sheet holds 4 frames per row; rows are idle, action, death.
    pub fn builtin() -> Self {
        let mut manifest = Self::new();
        for name in ["ship.png", "enemy-ship.png", "projectile.png", "enemy-projectile.png"] {
            manifest.register_texture(&format!("{TEXTURE_DIR}/{name}"), 128, 96);
        }
        manifest.register_texture(&format!("{TEXTURE_DIR}/boss.png"), 512, 384);
        manifest.register_texture(&format!("{TEXTURE_DIR}/boss-projectile.png"), 128, 96);
        for sound in SoundName::ALL {
            manifest.register_sound(&sound.path());
        }
        manifest.register_font(FONT_PATH);
        manifest
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn register_texture(&mut self, path: &str, width: u32, height: u32) -> TextureHandle {
        let handle = TextureHandle(self.next());
        self.textures.insert(
            path.to_string(),
            TextureInfo {
                handle,
                width,
                height,
            },
        );
        handle
    }

    pub fn register_sound(&mut self, path: &str) -> SoundHandle {
        let handle = SoundHandle(self.next());
        self.sounds.insert(path.to_string(), handle);
        handle
    }

    pub fn register_font(&mut self, path: &str) -> FontHandle {
        let handle = FontHandle(self.next());
        self.fonts.insert(path.to_string(), handle);
        handle
    }

    pub fn forget(&mut self, path: &str) {
        self.textures.remove(path);
        self.sounds.remove(path);
        self.fonts.remove(path);
    }
}

impl AssetLoader for Manifest {
    fn load_texture(&mut self, path: &str) -> Result<TextureInfo, AssetError> {
        self.textures
            .get(path)
            .copied()
            .ok_or_else(|| AssetError::MissingTexture(path.to_string()))
    }

    fn load_sound(&mut self, path: &str) -> Result<SoundHandle, AssetError> {
        self.sounds
            .get(path)
            .copied()
            .ok_or_else(|| AssetError::MissingSound(path.to_string()))
    }

    fn load_font(&mut self, path: &str) -> Result<FontHandle, AssetError> {
        self.fonts
            .get(path)
            .copied()
            .ok_or_else(|| AssetError::MissingFont(path.to_string()))
    }
}
