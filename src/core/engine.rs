use crate::config::DatasetConfig;
use crate::core::caption::{is_valid_tag, Caption, TAG_DELIMITER};
use crate::core::queue::{self, OnboardingPrompt, OnboardingQueue};
use crate::core::scan::scan_corpus;
use crate::core::trie::PrefixTrie;
use crate::core::types::{DatasetRecord, TagAction, TagCount, Target};
use crate::error::{DatasetError, Result};
use crate::persistence::{create_empty_caption, load_caption, save_caption};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything known about the corpus being curated: the image/caption pairs,
/// a trie of every tag in use, and the trigger word all captions lead with.
///
/// Captions are only written back on [`Dataset::save`] or
/// [`Dataset::save_record`].
pub struct Dataset {
    root: PathBuf,
    config: DatasetConfig,
    cache: BTreeMap<PathBuf, DatasetRecord>,
    tag_trie: PrefixTrie,
    trigger_word: Option<String>,
    add_caption_queue: Option<OnboardingQueue>,
    image_set: Vec<PathBuf>,
    display_index: usize,
}

impl Dataset {
    /// Scans `root`, resolves captionless images through `prompt`, then loads
    /// every caption and enforces the trigger word.
    pub fn open<P>(root: &Path, config: &DatasetConfig, prompt: &mut P) -> Result<Self>
    where
        P: OnboardingPrompt + ?Sized,
    {
        let mut dataset = Self {
            root: root.to_path_buf(),
            config: config.clone(),
            cache: BTreeMap::new(),
            tag_trie: PrefixTrie::new(),
            trigger_word: None,
            add_caption_queue: None,
            image_set: Vec::new(),
            display_index: 0,
        };
        dataset.expand_dataset(root)?;
        dataset.drain_onboarding(prompt)?;
        dataset.generate_tag_trie()?;
        dataset.image_set = dataset.cache.keys().cloned().collect();
        Ok(dataset)
    }

    fn expand_dataset(&mut self, root: &Path) -> Result<()> {
        let scan = scan_corpus(root, &self.config)?;
        for image in &scan.paired {
            self.register(image)?;
        }
        for image in scan.missing {
            self.add_caption_queue
                .get_or_insert_with(OnboardingQueue::new)
                .push(image);
        }
        info!(
            "Scanned {}: {} training pairs, {} images without captions",
            root.display(),
            scan.paired.len(),
            self.add_caption_queue.as_ref().map_or(0, OnboardingQueue::len)
        );
        Ok(())
    }

    fn drain_onboarding<P>(&mut self, prompt: &mut P) -> Result<()>
    where
        P: OnboardingPrompt + ?Sized,
    {
        let Some(mut pending) = self.add_caption_queue.take() else {
            return Ok(());
        };
        let queued = pending.len();
        let accepted = queue::drain(&mut pending, prompt, |image| {
            match create_empty_caption(&self.config.caption_path(image)) {
                Ok(()) => self.register(image),
                Err(DatasetError::CaptionMissing(path)) => {
                    warn!(
                        "{} exists but is not a file. Leaving {} out.",
                        path.display(),
                        self.relative(image).display()
                    );
                    Ok(false)
                }
                Err(e) => Err(e),
            }
        })?;
        info!(
            "Onboarding finished: {} captions created, {} images left out",
            accepted,
            queued - accepted
        );
        Ok(())
    }

    /// Adds an image whose caption file exists. Images already in the
    /// dataset are skipped. The caption itself is read during normalization,
    /// so this only runs while the dataset is being opened.
    fn register(&mut self, image: &Path) -> Result<bool> {
        if self.cache.contains_key(image) {
            debug!("Skipping {} (already in dataset)", self.relative(image).display());
            return Ok(false);
        }
        let caption_path = self.config.caption_path(image);
        if !caption_path.is_file() {
            return Err(DatasetError::CaptionMissing(caption_path));
        }
        info!(
            "Adding training pair: {} -> {}",
            self.relative(image).display(),
            self.relative(&caption_path).display()
        );
        self.cache.insert(
            image.to_path_buf(),
            DatasetRecord { image: image.to_path_buf(), caption_path, caption: None },
        );
        Ok(true)
    }

    /// Reads every caption, picks the trigger word from the first non-empty
    /// one, moves it to the front of every other caption and counts all tags.
    fn generate_tag_trie(&mut self) -> Result<()> {
        if self.cache.is_empty() {
            return Err(DatasetError::EmptyDataset);
        }
        for record in self.cache.values_mut() {
            match load_caption(&record.caption_path) {
                Ok(caption) => record.caption = Some(caption),
                Err(e) => warn!(
                    "Could not read caption {}: {}. Leaving it out of the tag index.",
                    record.caption_path.display(),
                    e
                ),
            }
        }

        self.trigger_word = self
            .cache
            .values()
            .filter_map(|record| record.caption.as_ref())
            .find_map(|caption| caption.first().map(str::to_string));

        for record in self.cache.values_mut() {
            let Some(caption) = record.caption.as_mut() else {
                continue;
            };
            if let Some(trigger) = &self.trigger_word {
                if caption.first() != Some(trigger.as_str()) {
                    warn!(
                        "Trigger word '{}' not leading {}. Inserting it in memory.",
                        trigger,
                        record.caption_path.display()
                    );
                    caption.lead_with(trigger);
                }
            }
            for tag in caption.unique_tags() {
                if is_valid_tag(tag) {
                    self.tag_trie.add(tag);
                }
            }
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn trigger_word(&self) -> Option<&str> {
        self.trigger_word.as_deref()
    }

    pub fn tag_trie(&self) -> &PrefixTrie {
        &self.tag_trie
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &DatasetRecord> {
        self.cache.values()
    }

    pub fn record(&self, image: &Path) -> Result<&DatasetRecord> {
        self.cache
            .get(image)
            .ok_or_else(|| DatasetError::UnknownRecord(image.to_path_buf()))
    }

    /// Caption as it would be written to disk, if it was loaded.
    pub fn caption_text(&self, image: &Path) -> Result<Option<String>> {
        Ok(self.record(image)?.caption().map(Caption::to_string))
    }

    // --- Display cursor ---

    /// Images in display order.
    pub fn image_set(&self) -> &[PathBuf] {
        &self.image_set
    }

    pub fn display_index(&self) -> usize {
        self.display_index
    }

    pub fn set_display_index(&mut self, index: usize) -> bool {
        if index >= self.image_set.len() {
            return false;
        }
        self.display_index = index;
        true
    }

    pub fn current_image(&self) -> Option<&Path> {
        self.image_set.get(self.display_index).map(PathBuf::as_path)
    }

    pub fn next(&mut self) -> Option<&Path> {
        if !self.image_set.is_empty() {
            self.display_index = (self.display_index + 1) % self.image_set.len();
        }
        self.current_image()
    }

    pub fn previous(&mut self) -> Option<&Path> {
        if !self.image_set.is_empty() {
            self.display_index = self
                .display_index
                .checked_sub(1)
                .unwrap_or(self.image_set.len() - 1);
        }
        self.current_image()
    }

    // --- Tag lookup ---

    pub fn tag_in_caption(&self, tag: &str, image: &Path) -> Result<bool> {
        Ok(self
            .record(image)?
            .caption()
            .map_or(false, |caption| caption.contains(tag.trim())))
    }

    /// Autocomplete candidates for `prefix`, never including the trigger word.
    /// With `negate` only tags the image already carries are offered (for
    /// removal), otherwise only tags it lacks.
    pub fn suggest(&self, prefix: &str, image: Option<&Path>, negate: bool, limit: usize) -> Vec<String> {
        let caption = image
            .and_then(|image| self.cache.get(image))
            .and_then(DatasetRecord::caption);
        self.tag_trie
            .words_with_prefix(prefix)
            .into_iter()
            .filter(|tag| Some(tag.as_str()) != self.trigger_word())
            .filter(|tag| match caption {
                Some(caption) => caption.contains(tag) == negate,
                None => !negate,
            })
            .take(limit)
            .collect()
    }

    /// Tags starting with `prefix` and how many captions carry each.
    pub fn tag_counts(&self, prefix: &str) -> Vec<TagCount> {
        self.tag_trie
            .entries_with_prefix(prefix)
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect()
    }

    // --- Tag mutation ---

    /// Returns the cleaned tag, or `None` if it must not be mutated.
    fn mutable_tag<'t>(&self, tag: &'t str) -> Option<&'t str> {
        let tag = tag.trim();
        if !is_valid_tag(tag) || tag.contains(TAG_DELIMITER) {
            debug!("Ignoring unusable tag '{}'", tag);
            return None;
        }
        if self.trigger_word() == Some(tag) {
            warn!("The trigger word '{}' is locked", tag);
            return None;
        }
        Some(tag)
    }

    /// Appends `tag` to the targeted captions that lack it. Returns the number
    /// of captions changed.
    ///
    /// `Target::All` walks the records one by one; nothing is staged, so each
    /// change stands on its own.
    pub fn add_tag_to_image_caption(&mut self, tag: &str, target: Target<'_>) -> Result<usize> {
        let Some(tag) = self.mutable_tag(tag) else {
            return Ok(0);
        };
        match target {
            Target::Record(image) => {
                let record = self
                    .cache
                    .get_mut(image)
                    .ok_or_else(|| DatasetError::UnknownRecord(image.to_path_buf()))?;
                Ok(usize::from(add_to_record(record, &mut self.tag_trie, tag)))
            }
            Target::All => {
                let mut changed = 0;
                for record in self.cache.values_mut() {
                    if add_to_record(record, &mut self.tag_trie, tag) {
                        changed += 1;
                    }
                }
                Ok(changed)
            }
        }
    }

    /// Removes `tag` from the targeted captions that carry it. Returns the
    /// number of captions changed.
    pub fn remove_tag_from_image_caption(&mut self, tag: &str, target: Target<'_>) -> Result<usize> {
        let Some(tag) = self.mutable_tag(tag) else {
            return Ok(0);
        };
        match target {
            Target::Record(image) => {
                let record = self
                    .cache
                    .get_mut(image)
                    .ok_or_else(|| DatasetError::UnknownRecord(image.to_path_buf()))?;
                Ok(usize::from(remove_from_record(record, &mut self.tag_trie, tag)))
            }
            Target::All => {
                let mut changed = 0;
                for record in self.cache.values_mut() {
                    if remove_from_record(record, &mut self.tag_trie, tag) {
                        changed += 1;
                    }
                }
                Ok(changed)
            }
        }
    }

    /// Applies a curator action. `current` is the displayed image; it may be
    /// omitted only for the `*_all` actions.
    pub fn apply(&mut self, action: TagAction, tag: &str, current: Option<&Path>) -> Result<usize> {
        let target = Target::resolve(current, action.is_all())?;
        if action.is_all() {
            info!("{} '{}' across {} captions", action.as_str(), tag, self.len());
        }
        match action {
            TagAction::Apply | TagAction::ApplyAll => self.add_tag_to_image_caption(tag, target),
            TagAction::Delete | TagAction::DeleteAll => self.remove_tag_from_image_caption(tag, target),
        }
    }

    // --- Persistence ---

    /// Writes every loaded caption back to its file.
    pub fn save(&self) -> Result<usize> {
        if self.cache.is_empty() {
            return Err(DatasetError::EmptyDataset);
        }
        if let Some(record) = self.cache.values().find(|r| !r.caption_path.is_file()) {
            return Err(DatasetError::CaptionMissing(record.caption_path.clone()));
        }
        let mut saved = 0;
        for record in self.cache.values() {
            if self.write_record(record)? {
                saved += 1;
            }
        }
        info!("Saved {} captions under {}", saved, self.root.display());
        Ok(saved)
    }

    /// Writes a single caption back to its file.
    pub fn save_record(&self, image: &Path) -> Result<bool> {
        let record = self.record(image)?;
        self.write_record(record)
    }

    fn write_record(&self, record: &DatasetRecord) -> Result<bool> {
        let Some(caption) = record.caption() else {
            warn!("Not saving {}: caption was never loaded", record.caption_path.display());
            return Ok(false);
        };
        debug!(
            "Saving caption for {} at {}",
            self.relative(&record.image).display(),
            self.relative(&record.caption_path).display()
        );
        save_caption(&record.caption_path, caption)?;
        Ok(true)
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

fn add_to_record(record: &mut DatasetRecord, trie: &mut PrefixTrie, tag: &str) -> bool {
    let Some(caption) = record.caption.as_mut() else {
        debug!("Skipping {}: caption not loaded", record.image.display());
        return false;
    };
    if !caption.push(tag) {
        return false;
    }
    trie.add(tag);
    true
}

fn remove_from_record(record: &mut DatasetRecord, trie: &mut PrefixTrie, tag: &str) -> bool {
    let Some(caption) = record.caption.as_mut() else {
        debug!("Skipping {}: caption not loaded", record.image.display());
        return false;
    };
    if !caption.remove(tag) {
        return false;
    }
    trie.remove(tag);
    true
}
