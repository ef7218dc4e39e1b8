pub mod cancel;
pub mod crawler;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod result;
pub mod seed;
pub mod select;
pub mod sink;
pub mod throttle;
pub mod visited;

pub use cancel::CancelToken;
pub use crawler::{BatchEvent, Crawler, DepthMode, ProgressCallback};
pub use error::{CrawlError, FetchError, ParseError};
pub use fetch::{FetchedPage, Fetcher, HttpFetcher};
pub use parse::{ContentMode, HtmlPageParser, PageParser, ParsedPage, RawLink};
pub use result::{BatchOutcome, CrawlOutcome, CrawlRecord, CrawlStats, SeedFailure};
pub use seed::{Seed, SeedKind};
pub use select::{LinkCandidate, LinkFilter};
pub use sink::{CallbackSink, JsonlSink, RecordSink};
pub use throttle::Throttle;
pub use visited::{VisitedPolicy, VisitedSet};
