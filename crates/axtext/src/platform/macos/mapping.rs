/*!
Bidirectional mappings between axtext accessibility types and macOS AX* strings.
*/

use crate::a11y::{Notification, Role};

/// macOS notification string constants (kAX*Notification).
mod ax_notification {
  pub(super) const SELECTED_TEXT_CHANGED: &str = "AXSelectedTextChanged";
  pub(super) const FOCUSED_ELEMENT_CHANGED: &str = "AXFocusedUIElementChanged";
  pub(super) const VALUE_CHANGED: &str = "AXValueChanged";
  pub(super) const TITLE_CHANGED: &str = "AXTitleChanged";
  pub(super) const DESTROYED: &str = "AXUIElementDestroyed";
  pub(super) const LAYOUT_CHANGED: &str = "AXLayoutChanged";
}

/// Convert our Notification to macOS notification string.
pub(super) const fn notification_to_macos(n: Notification) -> &'static str {
  match n {
    Notification::SelectedTextChanged => ax_notification::SELECTED_TEXT_CHANGED,
    Notification::FocusedElementChanged => ax_notification::FOCUSED_ELEMENT_CHANGED,
    Notification::ValueChanged => ax_notification::VALUE_CHANGED,
    Notification::TitleChanged => ax_notification::TITLE_CHANGED,
    Notification::Destroyed => ax_notification::DESTROYED,
    Notification::LayoutChanged => ax_notification::LAYOUT_CHANGED,
  }
}

/// Convert macOS notification string to our Notification.
pub(super) fn notification_from_macos(s: &str) -> Option<Notification> {
  match s {
    ax_notification::SELECTED_TEXT_CHANGED => Some(Notification::SelectedTextChanged),
    ax_notification::FOCUSED_ELEMENT_CHANGED => Some(Notification::FocusedElementChanged),
    ax_notification::VALUE_CHANGED => Some(Notification::ValueChanged),
    ax_notification::TITLE_CHANGED => Some(Notification::TitleChanged),
    ax_notification::DESTROYED => Some(Notification::Destroyed),
    ax_notification::LAYOUT_CHANGED => Some(Notification::LayoutChanged),
    _ => None,
  }
}

/// Map macOS role string to our Role enum.
pub(super) fn role_from_macos(platform_role: &str) -> Role {
  match platform_role {
    "AXApplication" => Role::Application,
    "AXWindow" | "AXSheet" | "AXDrawer" => Role::Window,
    "AXGroup" | "AXSplitGroup" | "AXRadioGroup" | "AXTabGroup" => Role::Group,
    "AXToolbar" => Role::Toolbar,
    "AXScrollArea" => Role::ScrollArea,
    "AXWebArea" => Role::WebArea,
    "AXStaticText" => Role::StaticText,
    "AXTextField" | "AXComboBox" | "AXSearchField" => Role::TextField,
    "AXTextArea" => Role::TextArea,
    "AXHeading" => Role::Heading,
    "AXLink" => Role::Link,
    "AXButton" | "AXMenuButton" | "AXPopUpButton" => Role::Button,
    "AXCheckBox" | "AXToggle" => Role::Checkbox,
    "AXRadioButton" => Role::RadioButton,
    "AXImage" => Role::Image,
    _ => Role::Unknown,
  }
}
