//! Reading the CORPUS, NaPTAN and timetable feeds.

mod convert;
mod error;
mod reader;
mod types;

pub use convert::{corpus_record, schedule, stop_point};
pub use error::{ConversionError, FeedError};
pub use reader::{ScheduleReader, iter_schedules, load_corpus, load_stop_points, parse_schedule_line};
pub use types::{
    CodeValue, CorpusEntry, CorpusExtract, NaptanRow, ScheduleDto, ScheduleLocationDto,
    ScheduleSegmentDto, TimetableRecord,
};
