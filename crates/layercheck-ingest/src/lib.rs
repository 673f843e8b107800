//! # layercheck-ingest
//!
//! Syntax-light source ingestion: turns one file's bytes into an immutable
//! [`FileFacts`] record (imports, exports, call sites of interest). No AST
//! is built and no types are resolved; extraction answers only "what does
//! this file import, export, and directly call".
//!
//! Extraction is a pure transform of bytes to facts with no shared state,
//! so the [`Ingestor`] runs one worker per file over a parallel directory
//! walk and collects owned results through a channel.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ecmascript;
mod extract;
mod facts;
mod pipeline;
mod python;

pub use ecmascript::EcmaScriptExtractor;
pub use extract::SourceExtractor;
pub use facts::{CallSite, FileFacts, ImportRef, Language};
pub use pipeline::{IngestError, IngestOutcome, Ingestor};
pub use python::PythonExtractor;
