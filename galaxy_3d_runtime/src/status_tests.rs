/// Tests for StatusCell
///
/// These tests validate the forward-only transitions of the lifecycle status.

use super::*;

#[test]
fn test_status_cell_starts_idle() {
    let cell = StatusCell::new();
    assert_eq!(cell.get(), Status::Idle);
    assert!(!cell.is_running());
    assert!(!cell.is_disposed());
}

#[test]
fn test_status_cell_forward_transitions() {
    let mut cell = StatusCell::new();
    cell.advance(Status::Running).unwrap();
    assert!(cell.is_running());
    cell.advance(Status::Disposed).unwrap();
    assert!(cell.is_disposed());
}

#[test]
fn test_status_cell_idle_to_disposed() {
    let mut cell = StatusCell::new();
    assert!(cell.advance(Status::Disposed).is_ok());
    assert_eq!(cell.get(), Status::Disposed);
}

#[test]
fn test_status_cell_same_state_is_noop() {
    let mut cell = StatusCell::new();
    cell.advance(Status::Running).unwrap();
    assert!(cell.advance(Status::Running).is_ok());
    assert_eq!(cell.get(), Status::Running);
}

#[test]
fn test_status_cell_rejects_backward_transition() {
    let mut cell = StatusCell::new();
    cell.advance(Status::Disposed).unwrap();

    let result = cell.advance(Status::Idle);
    assert!(matches!(result, Err(Error::InvalidState(_))));
    assert!(cell.advance(Status::Running).is_err());
    assert_eq!(cell.get(), Status::Disposed);
}

#[test]
fn test_status_display() {
    assert_eq!(Status::Idle.to_string(), "Idle");
    assert_eq!(Status::Running.to_string(), "Running");
    assert_eq!(Status::Disposed.to_string(), "Disposed");
}
