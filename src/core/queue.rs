// File: src/core/queue.rs
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Images found without a caption file, waiting for a decision.
/// Last pushed is first popped.
#[derive(Debug, Default)]
pub struct OnboardingQueue {
    items: Vec<PathBuf>,
}

impl OnboardingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image: PathBuf) {
        self.items.push(image);
    }

    pub fn pop(&mut self) -> Option<PathBuf> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&Path> {
        self.items.last().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Answer for a single queued image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingDecision {
    /// Create an empty caption file and add the pair to the dataset.
    Confirm,
    /// Drop the image from the dataset.
    Decline,
    /// Confirm this image and every one still queued.
    ConfirmAll,
    /// Decline this image and every one still queued.
    DeclineAll,
}

/// The collaborator asked about each captionless image. Called synchronously,
/// one image at a time, while the dataset is being opened.
pub trait OnboardingPrompt {
    /// `remaining` counts the images still queued behind this one.
    fn decide(&mut self, image: &Path, remaining: usize) -> Result<OnboardingDecision>;
}

/// Gives the same answer for every image.
pub struct FixedDecision(pub OnboardingDecision);

impl OnboardingPrompt for FixedDecision {
    fn decide(&mut self, _image: &Path, _remaining: usize) -> Result<OnboardingDecision> {
        Ok(self.0)
    }
}

impl<F> OnboardingPrompt for F
where
    F: FnMut(&Path, usize) -> Result<OnboardingDecision>,
{
    fn decide(&mut self, image: &Path, remaining: usize) -> Result<OnboardingDecision> {
        self(image, remaining)
    }
}

/// Drains `queue`, handing each confirmed image to `accept`, which reports
/// whether the image was actually taken in.
///
/// Once a bulk decision is made the prompt is not consulted again. Returns the
/// number of accepted images.
pub fn drain<P, A>(queue: &mut OnboardingQueue, prompt: &mut P, mut accept: A) -> Result<usize>
where
    P: OnboardingPrompt + ?Sized,
    A: FnMut(&Path) -> Result<bool>,
{
    let mut bulk: Option<bool> = None;
    let mut accepted = 0;
    while let Some(image) = queue.pop() {
        let confirm = match bulk {
            Some(all) => all,
            None => match prompt.decide(&image, queue.len())? {
                OnboardingDecision::Confirm => true,
                OnboardingDecision::Decline => false,
                OnboardingDecision::ConfirmAll => {
                    bulk = Some(true);
                    true
                }
                OnboardingDecision::DeclineAll => {
                    bulk = Some(false);
                    false
                }
            },
        };
        if confirm && accept(&image)? {
            accepted += 1;
        }
    }
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(names: &[&str]) -> OnboardingQueue {
        let mut queue = OnboardingQueue::new();
        for name in names {
            queue.push(PathBuf::from(name));
        }
        queue
    }

    #[test]
    fn pops_last_pushed_first() {
        let mut queue = queue_of(&["a.png", "b.png"]);
        assert_eq!(queue.peek(), Some(Path::new("b.png")));
        assert_eq!(queue.pop(), Some(PathBuf::from("b.png")));
        assert_eq!(queue.pop(), Some(PathBuf::from("a.png")));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn decline_all_stops_prompting() {
        let mut queue = queue_of(&["a.png", "b.png", "c.png"]);
        let mut asked = Vec::new();
        let mut prompt = |image: &Path, _remaining: usize| -> Result<OnboardingDecision> {
            asked.push(image.to_path_buf());
            Ok(if asked.len() == 1 {
                OnboardingDecision::Confirm
            } else {
                OnboardingDecision::DeclineAll
            })
        };
        let mut accepted = Vec::new();
        let count = drain(&mut queue, &mut prompt, |image| {
            accepted.push(image.to_path_buf());
            Ok(true)
        })
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(asked, vec![PathBuf::from("c.png"), PathBuf::from("b.png")]);
        assert_eq!(accepted, vec![PathBuf::from("c.png")]);
        assert!(queue.is_empty());
    }

    #[test]
    fn confirm_all_accepts_the_rest() {
        let mut queue = queue_of(&["a.png", "b.png", "c.png"]);
        let mut prompts = 0;
        let mut prompt = |_: &Path, remaining: usize| -> Result<OnboardingDecision> {
            prompts += 1;
            assert_eq!(remaining, 2);
            Ok(OnboardingDecision::ConfirmAll)
        };
        let count = drain(&mut queue, &mut prompt, |_| Ok(true)).unwrap();
        assert_eq!(count, 3);
        assert_eq!(prompts, 1);
    }

    #[test]
    fn refused_images_are_not_counted() {
        let mut queue = queue_of(&["a.png", "b.png"]);
        let mut offered = 0;
        let count = drain(&mut queue, &mut FixedDecision(OnboardingDecision::Confirm), |image| {
            offered += 1;
            Ok(image != Path::new("b.png"))
        })
        .unwrap();
        assert_eq!(offered, 2);
        assert_eq!(count, 1);
    }

    #[test]
    fn fixed_decline_accepts_nothing() {
        let mut queue = queue_of(&["a.png", "b.png"]);
        let count = drain(&mut queue, &mut FixedDecision(OnboardingDecision::Decline), |_| {
            panic!("nothing should be accepted")
        })
        .unwrap();
        assert_eq!(count, 0);
    }
}
