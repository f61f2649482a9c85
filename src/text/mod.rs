//! Text processing: sentence segmentation, keyword classification,
//! heading extraction, output cleanup and metadata inference.

mod classify;
mod format;
mod headings;
pub mod infer;
mod segment;

pub use classify::{
    keywords, score_sentence, SectionClassifier, FUTURE_WORK_NOT_STATED, LIMITATIONS_NOT_EXPLICIT,
};
pub use format::{clean_section_text, format_sections, is_noisy_sentence};
pub use headings::{citation_summary, pick_first_non_empty, HeadingSections, HeadingSegmenter};
pub use segment::{collapse_whitespace, lines, normalize_lines, sentences, Sentences};
