//! Upload sessions.
//!
//! Every upload gets an [`UploadTicket`] stamped with a generation number.
//! Only the result carrying the newest generation is applied; a late result
//! for an upload the user has already replaced is dropped.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::metadata::ImageMetadata;
use crate::params::{ParameterStore, RenderParameters, map_metadata};

/// Receipt for one upload. Hand it back to [`Session::complete`] with the
/// extraction result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
    pub file_name: String,
}

impl UploadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Parameter state for the current photo.
///
/// Owns the [`ParameterStore`] the frame loop reads, the metadata of the
/// last applied upload and the seeded generator every mapping draws from.
pub struct Session {
    generation: u64,
    store: ParameterStore,
    metadata: Option<ImageMetadata>,
    rng: StdRng,
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self {
            generation: 0,
            store: ParameterStore::new(RenderParameters::default()),
            metadata: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Start a new upload, superseding any in flight.
    ///
    /// The previous photo's metadata, mapped parameters and knob overrides
    /// are discarded; frames drawn while extraction is pending use defaults.
    pub fn begin_upload(&mut self, file_name: impl Into<String>) -> UploadTicket {
        self.generation += 1;
        self.metadata = None;
        self.store.replace_base(RenderParameters::default());
        UploadTicket {
            generation: self.generation,
            file_name: file_name.into(),
        }
    }

    pub fn is_current(&self, ticket: &UploadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Generator for an extraction run, derived from the session seed.
    pub fn extraction_rng(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.rng.random())
    }

    /// Apply an extraction result. Returns false if the ticket is stale.
    pub fn complete(&mut self, ticket: &UploadTicket, metadata: ImageMetadata) -> bool {
        if !self.is_current(ticket) {
            tracing::info!(
                file = %ticket.file_name,
                generation = ticket.generation,
                current = self.generation,
                "[session] dropping result for superseded upload"
            );
            return false;
        }
        let params = map_metadata(&metadata, &mut self.rng);
        tracing::info!(
            file = %ticket.file_name,
            pattern = params.pattern.name(),
            fields = metadata.known_fields(),
            "[session] parameters updated"
        );
        self.store.replace_base(params);
        self.metadata = Some(metadata);
        true
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ParameterStore {
        &mut self.store
    }

    /// Metadata of the last applied upload.
    pub fn metadata(&self) -> Option<&ImageMetadata> {
        self.metadata.as_ref()
    }
}
