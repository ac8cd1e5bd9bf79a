//! Editor session: everything one editing context owns.
//!
//! The session ties the keyframe store, loop markers, grid selection,
//! clipboard and preview sequencer together. Bulk edits act on the selected
//! cells, or on the whole grid when nothing is selected.

use tracing::info;

use crate::config::Config;
use crate::error::{ChoreoError, ChoreoResult};
use crate::export::FirmwareExporter;
use crate::models::{CascadeMode, CellAddress, Direction, Hand, Keyframe, LoopRange, Selection};
use crate::parser::Snapshot;
use crate::playback::{FrameSink, PlaybackSettings, PlaybackToggle, Sequencer, TimeSource};
use crate::services::clipboard::ClockClipboard;
use crate::services::keyframe_store::{KeyframeStore, Reorder};

/// One editing context for a choreography.
#[derive(Debug, Clone)]
pub struct EditorSession {
    name: String,
    store: KeyframeStore,
    loop_range: LoopRange,
    selection: Selection,
    clipboard: ClockClipboard,
    sequencer: Sequencer,
}

impl EditorSession {
    /// Creates a session with one default keyframe and no loop.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: KeyframeStore::new(),
            loop_range: LoopRange::new(),
            selection: Selection::new(),
            clipboard: ClockClipboard::new(),
            sequencer: Sequencer::new(PlaybackSettings::default()),
        }
    }

    /// Creates a session using configured project defaults and playback timing.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut session = Self::new(config.project.default_name.clone());
        session
            .loop_range
            .set_count(config.project.default_loop_count);
        session.sequencer.set_settings(config.playback_settings());
        session
    }

    // === Accessors ===

    /// Project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the project.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Keyframe sequence.
    #[must_use]
    pub const fn store(&self) -> &KeyframeStore {
        &self.store
    }

    /// Loop markers.
    #[must_use]
    pub const fn loop_range(&self) -> &LoopRange {
        &self.loop_range
    }

    /// Selected cells.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Clipboard contents.
    #[must_use]
    pub const fn clipboard(&self) -> &ClockClipboard {
        &self.clipboard
    }

    /// Preview sequencer.
    #[must_use]
    pub const fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Index of the keyframe being edited.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.store.current_index()
    }

    /// Keyframe being edited.
    #[must_use]
    pub fn current_keyframe(&self) -> &Keyframe {
        self.store.current()
    }

    // === Keyframe sequence ===

    /// Adds a default keyframe at the end and selects it.
    pub fn append_keyframe(&mut self) -> usize {
        self.store.append()
    }

    /// Inserts a default keyframe after the current one and selects it.
    pub fn insert_keyframe(&mut self) -> usize {
        self.store.insert_after_current()
    }

    /// Duplicates the current keyframe and selects the copy.
    pub fn duplicate_keyframe(&mut self) -> usize {
        self.store.duplicate_current()
    }

    /// Deletes the current keyframe.
    pub fn delete_keyframe(&mut self) -> ChoreoResult<()> {
        self.store.delete_current().map(|_| ())
    }

    /// Moves a keyframe; see [`KeyframeStore::move_to`].
    pub fn move_keyframe(&mut self, from: usize, to: usize, insert_before: bool) -> ChoreoResult<usize> {
        self.store.move_to(from, to, insert_before)
    }

    /// Swaps the current keyframe with its predecessor.
    pub fn swap_with_previous(&mut self) -> Reorder {
        self.store.swap_with_previous()
    }

    /// Swaps the current keyframe with its successor.
    pub fn swap_with_next(&mut self) -> Reorder {
        self.store.swap_with_next()
    }

    /// Selects the keyframe to edit.
    pub fn select_keyframe(&mut self, index: usize) -> ChoreoResult<()> {
        self.store.select(index)
    }

    /// Steps back one keyframe; false at the start.
    pub fn select_previous_keyframe(&mut self) -> bool {
        self.store.select_previous()
    }

    /// Steps forward one keyframe; false at the end.
    pub fn select_next_keyframe(&mut self) -> bool {
        self.store.select_next()
    }

    // === Current keyframe parameters ===

    /// Sets the comment of the current keyframe.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.store.current_mut().set_comment(comment);
    }

    /// Sets the speed of the current keyframe (clamped).
    pub fn set_speed(&mut self, speed: u32) {
        self.store.current_mut().set_speed(speed);
    }

    /// Sets the acceleration of the current keyframe (clamped).
    pub fn set_accel(&mut self, accel: u32) {
        self.store.current_mut().set_accel(accel);
    }

    /// Sets the hold time of the current keyframe.
    pub fn set_delay_ms(&mut self, delay_ms: u32) {
        self.store.current_mut().set_delay_ms(delay_ms);
    }

    /// Sets the cascade mode of the current keyframe.
    pub fn set_cascade_mode(&mut self, mode: CascadeMode) {
        self.store.current_mut().set_cascade_mode(mode);
    }

    /// Sets the cascade group delay of the current keyframe.
    pub fn set_cascade_delay_ms(&mut self, cascade_delay_ms: u32) {
        self.store.current_mut().set_cascade_delay_ms(cascade_delay_ms);
    }

    // === Cell edits ===

    /// Sets one hand angle of one face.
    pub fn set_angle(&mut self, cell: CellAddress, hand: Hand, angle: f64) {
        self.store.set_angle(cell, hand, angle);
    }

    /// Sets one hand direction of one face.
    pub fn set_direction(&mut self, cell: CellAddress, hand: Hand, direction: Direction) {
        self.store.set_direction(cell, hand, direction);
    }

    /// Sets both angles on the targeted faces.
    pub fn set_all_angles(&mut self, angle_h: f64, angle_m: f64) {
        let targets = self.selection.targets();
        self.store.set_all_angles(&targets, angle_h, angle_m);
    }

    /// Sets both directions on the targeted faces.
    pub fn set_all_directions(&mut self, dir_h: Direction, dir_m: Direction) {
        let targets = self.selection.targets();
        self.store.set_all_directions(&targets, dir_h, dir_m);
    }

    /// Left/right mirror of the targeted faces.
    pub fn apply_vertical_symmetry(&mut self) {
        let targets = self.selection.targets();
        self.store.apply_vertical_symmetry(&targets);
    }

    /// Top/bottom mirror of the targeted faces.
    pub fn apply_horizontal_symmetry(&mut self) {
        let targets = self.selection.targets();
        self.store.apply_horizontal_symmetry(&targets);
    }

    /// Puts the targeted faces back in the calibration pose.
    pub fn reset_cells(&mut self) {
        let targets = self.selection.targets();
        self.store.reset_cells(&targets);
    }

    // === Selection ===

    /// Toggles one face; see [`Selection::toggle`].
    pub fn toggle_cell(&mut self, cell: CellAddress, additive: bool) {
        self.selection.toggle(cell, additive);
    }

    /// Selects every face.
    pub fn select_all(&mut self) {
        self.selection.select_all();
    }

    /// Deselects every face.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selects one slave column.
    pub fn select_column(&mut self, slave: usize) -> ChoreoResult<()> {
        self.selection.select_column(slave)
    }

    /// Selects one clock row.
    pub fn select_row(&mut self, clock: usize) -> ChoreoResult<()> {
        self.selection.select_row(clock)
    }

    // === Clipboard ===

    /// Copies the selected faces of the current keyframe.
    pub fn copy_selection(&mut self) -> usize {
        self.clipboard.copy(&self.selection, self.store.current())
    }

    /// Pastes into the current keyframe; see [`ClockClipboard::paste`].
    pub fn paste(&mut self) -> usize {
        self.clipboard.paste(&self.selection, self.store.current_mut())
    }

    // === Loop ===

    fn check_keyframe_index(&self, index: usize) -> ChoreoResult<()> {
        if index >= self.store.len() {
            return Err(ChoreoError::IndexOutOfRange {
                index,
                len: self.store.len(),
            });
        }
        Ok(())
    }

    /// Sets the loop start to a keyframe index.
    pub fn set_loop_start(&mut self, index: usize) -> ChoreoResult<()> {
        self.check_keyframe_index(index)?;
        self.loop_range.set_start(index)?;
        info!(loop_range = %self.loop_range, "Loop start set");
        Ok(())
    }

    /// Sets the loop end to a keyframe index.
    pub fn set_loop_end(&mut self, index: usize) -> ChoreoResult<()> {
        self.check_keyframe_index(index)?;
        self.loop_range.set_end(index)?;
        info!(loop_range = %self.loop_range, "Loop end set");
        Ok(())
    }

    /// Starts the loop at the current keyframe.
    pub fn set_loop_start_here(&mut self) -> ChoreoResult<()> {
        self.set_loop_start(self.store.current_index())
    }

    /// Ends the loop at the current keyframe.
    pub fn set_loop_end_here(&mut self) -> ChoreoResult<()> {
        self.set_loop_end(self.store.current_index())
    }

    /// Removes both loop markers, keeping the repeat count.
    pub fn clear_loop(&mut self) {
        self.loop_range.clear();
        info!("Loop cleared");
    }

    /// Sets the loop repeat count (0 = infinite).
    pub fn set_loop_count(&mut self, count: u32) {
        self.loop_range.set_count(count);
    }

    /// Whether `index` lies inside the loop.
    #[must_use]
    pub fn is_index_in_loop(&self, index: usize) -> bool {
        self.loop_range.is_index_in_loop(index)
    }

    // === Playback ===

    /// Replaces the preview timing.
    pub fn set_playback_settings(&mut self, settings: PlaybackSettings) {
        self.sequencer.set_settings(settings);
    }

    /// Starts or stops the preview.
    pub fn toggle_playback(&mut self, now_ms: u64) -> ChoreoResult<PlaybackToggle> {
        self.sequencer
            .toggle(now_ms, self.store.keyframes(), &self.loop_range)
    }

    /// Stops the preview.
    pub fn stop_playback(&mut self) {
        self.sequencer.stop();
    }

    /// Whether the preview is running.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    /// Advances the preview to `now_ms`, rendering any frame into `sink`.
    pub fn tick(&mut self, now_ms: u64, sink: &mut impl FrameSink) -> bool {
        match self
            .sequencer
            .tick(now_ms, self.store.keyframes(), &self.loop_range)
        {
            Some(frame) => {
                sink.render(&frame);
                true
            }
            None => false,
        }
    }

    /// Advances the preview using `time`, rendering any frame into `sink`.
    pub fn drive(&mut self, time: &impl TimeSource, sink: &mut impl FrameSink) -> bool {
        self.sequencer
            .drive(time, self.store.keyframes(), &self.loop_range, sink)
    }

    // === Persistence and export ===

    /// Captures the session as a snapshot stamped now.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            name: self.name.clone(),
            version: crate::constants::FORMAT_VERSION.to_string(),
            created: chrono::Utc::now(),
            keyframes: self.store.keyframes().to_vec(),
            loop_range: self.loop_range,
        }
    }

    /// Replaces the session content with a snapshot.
    ///
    /// The first keyframe becomes current, the selection is cleared and
    /// playback stops. On error nothing changes.
    pub fn load_snapshot(&mut self, snapshot: Snapshot) -> ChoreoResult<()> {
        let store = KeyframeStore::from_keyframes(snapshot.keyframes)?;
        self.sequencer.stop();
        self.store = store;
        self.loop_range = snapshot.loop_range;
        self.name = snapshot.name;
        self.selection.clear();
        info!(name = %self.name, keyframes = self.store.len(), "Loaded snapshot into session");
        Ok(())
    }

    /// Generates the controller program fragment for this session.
    #[must_use]
    pub fn export_firmware(&self) -> String {
        FirmwareExporter::new(&self.name, &self.store, &self.loop_range).generate()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_PROJECT_NAME)
    }
}
