//! # Validator registry.
//!
//! The [`Registry`] is a catalogue of validator constructors assembled by the
//! composition root (see [`validators::registry`](crate::validators::registry)).
//! Nothing is instantiated at registration time: [`Registry::build`] calls
//! every constructor with the shared [`Dependencies`] and either returns the
//! whole validator set or every construction error at once.
//!
//! ```text
//! Registry::new()
//!   .register(ctor_a)          ctor: Fn(&Dependencies) -> Result<ValidatorRef, ValidatorError>
//!   .register(ctor_b)
//!   .build(&deps) ──► Ok([a, b])                        all constructors succeeded
//!                 └─► Err(BuildError::Construction{..}) every failing constructor
//!                 └─► Err(BuildError::DuplicateCode{..}) two validators share a code
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use bundlevisor::{
//!     Code, Dependencies, Descriptor, Registry, ValidationInput, ValidationResult, Validator,
//!     ValidatorError,
//! };
//!
//! struct AlwaysOk(Descriptor);
//!
//! #[async_trait]
//! impl Validator for AlwaysOk {
//!     fn descriptor(&self) -> &Descriptor { &self.0 }
//!     async fn validate(&self, _: CancellationToken, _: &ValidationInput) -> ValidationResult {
//!         self.0.success()
//!     }
//! }
//!
//! let registry = Registry::new().register(|_deps: &Dependencies| {
//!     let code = Code::new(1).map_err(ValidatorError::fatal)?;
//!     Ok(Arc::new(AlwaysOk(Descriptor::new(code, "ok", ""))) as _)
//! });
//!
//! let validators = registry.build(&Dependencies::new()).unwrap();
//! assert_eq!(validators.len(), 1);
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::{BuildError, ValidatorError};
use crate::validator::ValidatorRef;

/// Validator constructor stored by the registry.
pub type Constructor =
    Arc<dyn Fn(&Dependencies) -> Result<ValidatorRef, ValidatorError> + Send + Sync>;

/// Typed bag of shared clients and settings handed to constructors.
///
/// One value per type; inserting the same type twice replaces the first value.
#[derive(Clone, Default)]
pub struct Dependencies {
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, replacing any previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.values
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|v| v.downcast::<T>().ok())
    }

    /// Like [`get`](Self::get) but reports a missing dependency as a fatal
    /// construction error.
    pub fn require<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ValidatorError> {
        self.get::<T>()
            .ok_or_else(|| ValidatorError::fatal(format!("missing dependency {}", type_name::<T>())))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Catalogue of validator constructors.
#[derive(Clone, Default)]
pub struct Registry {
    constructors: Vec<Constructor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a constructor. Order carries no meaning.
    pub fn register<F>(mut self, ctor: F) -> Self
    where
        F: Fn(&Dependencies) -> Result<ValidatorRef, ValidatorError> + Send + Sync + 'static,
    {
        self.constructors.push(Arc::new(ctor));
        self
    }

    /// Appends every constructor of `other`.
    pub fn merge(mut self, other: Registry) -> Self {
        self.constructors.extend(other.constructors);
        self
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Instantiates every registered validator.
    ///
    /// All constructors run even after one fails, so the error lists every
    /// broken validator in a single pass.
    pub fn build(&self, deps: &Dependencies) -> Result<Vec<ValidatorRef>, BuildError> {
        let mut validators = Vec::with_capacity(self.constructors.len());
        let mut errors = Vec::new();

        for ctor in &self.constructors {
            match ctor(deps) {
                Ok(v) => validators.push(v),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(BuildError::Construction { errors });
        }

        let mut seen = BTreeSet::new();
        for v in &validators {
            let code = v.descriptor().code();
            if !seen.insert(code) {
                return Err(BuildError::DuplicateCode { code });
            }
        }

        Ok(validators)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("constructors", &self.constructors.len())
            .finish()
    }
}
