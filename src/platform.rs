//! Platform-specific key bindings

use crossterm::event::KeyModifiers;

/// Modifier for the submit shortcut
/// - macOS: SUPER (Cmd key) or CONTROL
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const SUBMIT_MODIFIERS: &[KeyModifiers] = &[KeyModifiers::SUPER, KeyModifiers::CONTROL];

#[cfg(not(target_os = "macos"))]
pub const SUBMIT_MODIFIERS: &[KeyModifiers] = &[KeyModifiers::CONTROL];

/// Submit shortcut display for the hints line
#[cfg(target_os = "macos")]
pub const SUBMIT_SHORTCUT: &str = "Cmd+S";

#[cfg(not(target_os = "macos"))]
pub const SUBMIT_SHORTCUT: &str = "Ctrl+S";

/// Dismiss shortcut display
pub const DISMISS_SHORTCUT: &str = "Esc";

/// Whether `modifiers` carry one of the submit modifiers
pub fn is_submit_modifier(modifiers: KeyModifiers) -> bool {
    SUBMIT_MODIFIERS.iter().any(|m| modifiers.contains(*m))
}
