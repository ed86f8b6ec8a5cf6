//! Wiring collaborators into resolver and registrar actors.

use std::sync::Arc;

use crate::{
    backend::{HistorySource, ProfileStore, ZonefileCodec, ZonefilePublisher},
    registrar::Registrar,
    resolver::Resolver,
};

/// Builder wiring the external collaborators into [`Resolver`] and
/// [`Registrar`] actors.
///
/// # Examples
/// ```no_run
/// # fn example(
/// #     history: std::sync::Arc<dyn subzone::backend::HistorySource>,
/// #     codec: std::sync::Arc<dyn subzone::backend::ZonefileCodec>,
/// #     profiles: std::sync::Arc<dyn subzone::backend::ProfileStore>,
/// # ) -> Result<(), subzone::BuildError> {
/// let resolver = subzone::SubzoneBuilder::default()
///     .history(history)
///     .codec(codec)
///     .profiles(profiles)
///     .build_resolver()?;
/// # Ok(()) }
/// ```
#[derive(Default)]
pub struct SubzoneBuilder {
    history: Option<Arc<dyn HistorySource>>,
    codec: Option<Arc<dyn ZonefileCodec>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    publisher: Option<Arc<dyn ZonefilePublisher>>,
}

impl SubzoneBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zonefile history source.
    pub fn history(mut self, history: Arc<dyn HistorySource>) -> Self {
        self.history = Some(history);
        self
    }

    /// Set the outer zonefile codec.
    pub fn codec(mut self, codec: Arc<dyn ZonefileCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Set the profile store.
    pub fn profiles(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Set the zonefile publisher (only needed for a [`Registrar`]).
    pub fn publisher(mut self, publisher: Arc<dyn ZonefilePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Build a read-only [`Resolver`].
    pub fn build_resolver(&self) -> Result<Resolver, BuildError> {
        Ok(Resolver::new(
            self.history
                .clone()
                .ok_or(BuildError::MissingCollaborator("history"))?,
            self.codec
                .clone()
                .ok_or(BuildError::MissingCollaborator("codec"))?,
            self.profiles
                .clone()
                .ok_or(BuildError::MissingCollaborator("profiles"))?,
        ))
    }

    /// Build a [`Registrar`]; requires all four collaborators.
    pub fn build_registrar(&self) -> Result<Registrar, BuildError> {
        Ok(Registrar::new(
            self.build_resolver()?,
            self.history
                .clone()
                .ok_or(BuildError::MissingCollaborator("history"))?,
            self.codec
                .clone()
                .ok_or(BuildError::MissingCollaborator("codec"))?,
            self.publisher
                .clone()
                .ok_or(BuildError::MissingCollaborator("publisher"))?,
        ))
    }
}

impl core::fmt::Debug for SubzoneBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SubzoneBuilder")
            .field("history", &self.history.is_some())
            .field("codec", &self.codec.is_some())
            .field("profiles", &self.profiles.is_some())
            .field("publisher", &self.publisher.is_some())
            .finish()
    }
}

/// Errors that can occur while building the actors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    /// A required collaborator was not supplied.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}
