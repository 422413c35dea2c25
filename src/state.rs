//! Controller lifecycle states and the image-acquisition loop.
//!
//! The acquisition driver is generic over the image source and the user
//! prompt so the AwaitingImage transitions can be exercised without a
//! clipboard or a message box.

use tracing::debug;

/// Lifecycle of the pin window controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinState {
    /// Constructed, graphics factories live, no window attached yet.
    Uninitialized,
    /// Window exists; waiting for the image source to yield a bitmap.
    AwaitingImage,
    /// Image pinned; normal hit-test/paint/resize operation.
    Ready,
    /// Inside an interactive resize; drag proposals are being corrected live.
    Resizing,
    /// Close requested; the message loop is ending or never starts.
    Closing,
}

/// User's answer to the "no image available" prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptChoice {
    Retry,
    Cancel,
}

/// Run the AwaitingImage loop: poll `source` until it yields an image,
/// prompting after every failure. Retry stays in AwaitingImage; success moves
/// to Ready and returns the image; cancel moves to Closing and returns None.
///
/// Only meaningful in AwaitingImage; any other state returns None untouched.
pub fn drive_acquisition<T, E, S, P>(state: &mut PinState, mut source: S, mut prompt: P) -> Option<T>
where
    S: FnMut() -> Result<T, E>,
    P: FnMut() -> PromptChoice,
{
    if *state != PinState::AwaitingImage {
        return None;
    }
    loop {
        match source() {
            Ok(image) => {
                *state = PinState::Ready;
                return Some(image);
            }
            Err(_) => {
                debug!("image source empty; prompting for retry or cancel");
                match prompt() {
                    PromptChoice::Retry => continue,
                    PromptChoice::Cancel => {
                        *state = PinState::Closing;
                        return None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_success_moves_to_ready() {
        let mut state = PinState::AwaitingImage;
        let got = drive_acquisition(&mut state, || Ok::<_, ()>(42), || unreachable!());
        assert_eq!(got, Some(42));
        assert_eq!(state, PinState::Ready);
    }

    #[test]
    fn two_failures_then_success_prompts_twice() {
        let mut state = PinState::AwaitingImage;
        let mut attempts = 0;
        let mut prompts = 0;
        let got = drive_acquisition(
            &mut state,
            || {
                attempts += 1;
                if attempts < 3 { Err(()) } else { Ok("image") }
            },
            || {
                prompts += 1;
                PromptChoice::Retry
            },
        );
        assert_eq!(got, Some("image"));
        assert_eq!(attempts, 3);
        assert_eq!(prompts, 2);
        assert_eq!(state, PinState::Ready);
    }

    #[test]
    fn cancel_moves_to_closing_without_an_image() {
        let mut state = PinState::AwaitingImage;
        let got = drive_acquisition(
            &mut state,
            || Err::<u8, _>(()),
            || PromptChoice::Cancel,
        );
        assert_eq!(got, None);
        assert_eq!(state, PinState::Closing);
    }

    #[test]
    fn ignored_outside_awaiting_image() {
        for start in [PinState::Uninitialized, PinState::Ready, PinState::Closing] {
            let mut state = start;
            let got = drive_acquisition(&mut state, || Ok::<_, ()>(1), || unreachable!());
            assert_eq!(got, None);
            assert_eq!(state, start);
        }
    }
}
