//! Keyboard bindings for scene commands.

use winit::keyboard::KeyCode;

use crate::scene::Command;

/// Command bound to a physical key, if any
pub fn command_for_key(key: KeyCode) -> Option<Command> {
    let command = match key {
        KeyCode::KeyA => Command::ToggleAxes,
        KeyCode::KeyC => Command::CycleAxesColor,
        KeyCode::KeyT => Command::CycleTextureMode,
        KeyCode::KeyD => Command::ToggleDepthCue,
        KeyCode::Digit0 => Command::ToggleLight(0),
        KeyCode::Digit1 => Command::ToggleLight(1),
        KeyCode::Digit2 => Command::ToggleLight(2),
        KeyCode::KeyV => Command::ToggleSphere,
        KeyCode::KeyP => Command::ToggleParticles,
        KeyCode::KeyS => Command::ToggleStage,
        KeyCode::KeyR => Command::ToggleRotation,
        KeyCode::KeyF => Command::ToggleFreeze,
        KeyCode::KeyO => Command::ToggleProjection,
        KeyCode::KeyB => Command::CycleBounce,
        KeyCode::F2 => Command::SetBounce(2),
        KeyCode::F4 => Command::SetBounce(4),
        KeyCode::F6 => Command::SetBounce(6),
        KeyCode::F8 => Command::SetBounce(8),
        // '=' shares a key with '+'
        KeyCode::Equal | KeyCode::NumpadAdd => Command::IncreaseFlow,
        KeyCode::Minus | KeyCode::NumpadSubtract => Command::DecreaseFlow,
        KeyCode::KeyM => Command::ToggleMusic,
        KeyCode::Home => Command::Reset,
        KeyCode::KeyQ | KeyCode::Escape => Command::Quit,
        _ => return None,
    };
    Some(command)
}
