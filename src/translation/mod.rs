/*!
 * Machine translation of cue text.
 *
 * - `batch`: groups cue lines into provider-sized batches and runs them
 *   with bounded concurrency, keeping document order
 */

pub use self::batch::{BatchTranslator, MAX_LINES_PER_BATCH, MIN_CHARS_PER_REQUEST};

pub mod batch;
