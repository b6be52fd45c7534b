/*! Error types for axtext operations.

`ElementError` and `ObserverError` mirror the accessibility framework's
`AXError` codes. Raw codes are mapped with [`ElementError::from_code`] and
[`ObserverError::from_code`] so the mapping is testable on every target.
*/

/// Raw `AXError` code values.
pub(crate) mod ax_code {
  pub(crate) const SUCCESS: i32 = 0;
  pub(crate) const ILLEGAL_ARGUMENT: i32 = -25201;
  pub(crate) const INVALID_UI_ELEMENT: i32 = -25202;
  pub(crate) const INVALID_UI_ELEMENT_OBSERVER: i32 = -25203;
  pub(crate) const CANNOT_COMPLETE: i32 = -25204;
  pub(crate) const ATTRIBUTE_UNSUPPORTED: i32 = -25205;
  pub(crate) const ACTION_UNSUPPORTED: i32 = -25206;
  pub(crate) const NOTIFICATION_UNSUPPORTED: i32 = -25207;
  pub(crate) const NOT_IMPLEMENTED: i32 = -25208;
  pub(crate) const NOTIFICATION_ALREADY_REGISTERED: i32 = -25209;
  pub(crate) const NOTIFICATION_NOT_REGISTERED: i32 = -25210;
  pub(crate) const API_DISABLED: i32 = -25211;
  pub(crate) const NO_VALUE: i32 = -25212;
  pub(crate) const PARAMETERIZED_ATTRIBUTE_UNSUPPORTED: i32 = -25213;
  pub(crate) const NOT_ENOUGH_PRECISION: i32 = -25214;
}

/// Errors from marker construction and type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessibilityError {
  /// A framework object had a different runtime type than expected.
  #[error("Type mismatch")]
  TypeMismatch,

  /// Input could not be turned into a framework object.
  #[error("Invalid input")]
  InvalidInput,
}

/// Errors from reading or writing element attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ElementError {
  #[error("Action is not supported by the element")]
  ActionUnsupported,

  #[error("Accessibility API is disabled")]
  ApiDisabled,

  #[error("Attribute is not supported by the element")]
  AttributeUnsupported,

  #[error("Parameterized attribute is not supported by the element")]
  ParameterizedAttributeUnsupported,

  #[error("Messaging failed or the application is busy or unresponsive")]
  CannotComplete,

  #[error("System error, such as a failed allocation")]
  Failure,

  #[error("Illegal argument")]
  IllegalArgument,

  #[error("Element is invalid")]
  InvalidUiElement,

  #[error("Not enough precision")]
  NotEnoughPrecision,

  #[error("Not implemented by the element or its process")]
  NotImplemented,

  #[error("Requested value or element does not exist")]
  NoValue,
}

impl ElementError {
  /// Map a raw, non-success `AXError` code.
  ///
  /// Codes that only make sense for observers fold into the closest
  /// element-level meaning.
  pub const fn from_code(code: i32) -> Self {
    match code {
      ax_code::ACTION_UNSUPPORTED => Self::ActionUnsupported,
      ax_code::API_DISABLED => Self::ApiDisabled,
      ax_code::ATTRIBUTE_UNSUPPORTED => Self::AttributeUnsupported,
      ax_code::PARAMETERIZED_ATTRIBUTE_UNSUPPORTED => Self::ParameterizedAttributeUnsupported,
      ax_code::CANNOT_COMPLETE | ax_code::NOTIFICATION_ALREADY_REGISTERED => Self::CannotComplete,
      ax_code::ILLEGAL_ARGUMENT => Self::IllegalArgument,
      ax_code::INVALID_UI_ELEMENT => Self::InvalidUiElement,
      ax_code::NOT_ENOUGH_PRECISION => Self::NotEnoughPrecision,
      ax_code::NOT_IMPLEMENTED => Self::NotImplemented,
      ax_code::NO_VALUE => Self::NoValue,
      _ => Self::Failure,
    }
  }

  /// `Ok(())` for success, the mapped error otherwise.
  pub const fn check(code: i32) -> Result<(), Self> {
    if code == ax_code::SUCCESS {
      Ok(())
    } else {
      Err(Self::from_code(code))
    }
  }
}

/// Errors from registering or removing notification observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ObserverError {
  #[error("Accessibility API is disabled")]
  ApiDisabled,

  #[error("Messaging failed or the application is busy or unresponsive")]
  CannotComplete,

  #[error("System error, such as a failed allocation")]
  Failure,

  #[error("Illegal argument")]
  IllegalArgument,

  #[error("Element is invalid")]
  InvalidUiElement,

  #[error("Observer is invalid")]
  InvalidUiElementObserver,

  #[error("Notification is already registered")]
  NotificationAlreadyRegistered,

  #[error("Notification is not supported by the element")]
  NotificationUnsupported,

  #[error("Not implemented by the element or its process")]
  NotImplemented,

  #[error("Notification is not registered")]
  NotificationNotRegistered,

  #[error("Requested value or element does not exist")]
  NoValue,
}

impl ObserverError {
  /// Map a raw, non-success `AXError` code.
  pub const fn from_code(code: i32) -> Self {
    match code {
      ax_code::API_DISABLED => Self::ApiDisabled,
      ax_code::CANNOT_COMPLETE => Self::CannotComplete,
      ax_code::ILLEGAL_ARGUMENT => Self::IllegalArgument,
      ax_code::INVALID_UI_ELEMENT => Self::InvalidUiElement,
      ax_code::INVALID_UI_ELEMENT_OBSERVER => Self::InvalidUiElementObserver,
      ax_code::NOTIFICATION_ALREADY_REGISTERED => Self::NotificationAlreadyRegistered,
      ax_code::NOTIFICATION_UNSUPPORTED => Self::NotificationUnsupported,
      ax_code::NOT_IMPLEMENTED => Self::NotImplemented,
      ax_code::NOTIFICATION_NOT_REGISTERED => Self::NotificationNotRegistered,
      ax_code::NO_VALUE => Self::NoValue,
      _ => Self::Failure,
    }
  }

  /// `Ok(())` for success, the mapped error otherwise.
  pub const fn check(code: i32) -> Result<(), Self> {
    if code == ax_code::SUCCESS {
      Ok(())
    } else {
      Err(Self::from_code(code))
    }
  }
}

/// Any error produced by axtext.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AxError {
  #[error(transparent)]
  Accessibility(#[from] AccessibilityError),

  #[error(transparent)]
  Element(#[from] ElementError),

  #[error(transparent)]
  Observer(#[from] ObserverError),

  #[error("Accessibility permissions not granted")]
  PermissionDenied,

  #[error("Operation not supported: {0}")]
  NotSupported(String),
}

/// Result type for marker operations and the `AxText` instance.
pub type AxResult<T> = Result<T, AxError>;

/// Result type for element attribute access.
pub type ElementResult<T> = Result<T, ElementError>;

/// Result type for observer registration.
pub type ObserverResult<T> = Result<T, ObserverError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn success_is_ok() {
    assert_eq!(ElementError::check(ax_code::SUCCESS), Ok(()));
    assert_eq!(ObserverError::check(ax_code::SUCCESS), Ok(()));
  }

  #[test]
  fn element_codes_map_to_variants() {
    assert_eq!(ElementError::from_code(ax_code::NO_VALUE), ElementError::NoValue);
    assert_eq!(
      ElementError::from_code(ax_code::ATTRIBUTE_UNSUPPORTED),
      ElementError::AttributeUnsupported
    );
    assert_eq!(
      ElementError::from_code(ax_code::PARAMETERIZED_ATTRIBUTE_UNSUPPORTED),
      ElementError::ParameterizedAttributeUnsupported
    );
  }

  #[test]
  fn already_registered_folds_into_cannot_complete() {
    assert_eq!(
      ElementError::from_code(ax_code::NOTIFICATION_ALREADY_REGISTERED),
      ElementError::CannotComplete
    );
  }

  #[test]
  fn unknown_codes_are_failures() {
    assert_eq!(ElementError::from_code(-1), ElementError::Failure);
    assert_eq!(ElementError::from_code(-25200), ElementError::Failure);
    assert_eq!(ObserverError::from_code(-25200), ObserverError::Failure);
    assert_eq!(ObserverError::from_code(12345), ObserverError::Failure);
  }

  #[test]
  fn observer_keeps_registration_codes() {
    assert_eq!(
      ObserverError::check(ax_code::NOTIFICATION_NOT_REGISTERED),
      Err(ObserverError::NotificationNotRegistered)
    );
    assert_eq!(
      ObserverError::from_code(ax_code::INVALID_UI_ELEMENT_OBSERVER),
      ObserverError::InvalidUiElementObserver
    );
  }

  #[test]
  fn umbrella_error_is_transparent() {
    let err: AxError = ElementError::NoValue.into();
    assert_eq!(err.to_string(), ElementError::NoValue.to_string());
  }
}
