pub mod collector;
pub mod config;
pub mod error;
pub mod merge;
pub mod ordering;
pub mod output;
pub mod pipeline;
pub mod progress;

pub use collector::{collect_batch, list_input_files, BatchResult, BatchSummary, FileFailure};
pub use config::{ConfigFile, RunConfig};
pub use error::{PipelineError, Result, SinkError};
pub use merge::{merge_records, MergeOptions, MergedSample, MergedTable};
pub use ordering::order_chronologically;
pub use output::{CsvSheetSink, MemorySink, OutputBundle, OutputTarget, SinkOptions, WorkbookSink};
pub use pipeline::{run, RunReport};
pub use progress::{NoProgress, Phase, ProgressEvent, ProgressObserver, ProgressRecorder, TracingProgress};
