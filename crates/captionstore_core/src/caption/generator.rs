//! Caption generator contract and memoizing summarizer wrapper.

use log::info;
use moka::sync::Cache;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of URLs whose captions are remembered by default.
pub const DEFAULT_MEMO_CAPACITY: usize = 1_000;

/// Error raised by caption generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionError {
    /// The upstream summarizer rejected or failed the request.
    Upstream(String),
}

impl Display for CaptionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upstream(message) => write!(f, "summarizer failed: {message}"),
        }
    }
}

impl Error for CaptionError {}

/// Parameters passed to an upstream summarizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeRequest {
    pub url: String,
    pub sentence_count: usize,
}

/// Produces captions for a URL.
pub trait CaptionGenerator: Send + Sync {
    fn generate(&self, url: &str, count: usize) -> Result<Vec<String>, CaptionError>;
}

/// Wraps a summarize function and remembers its answer per URL.
///
/// Entries are keyed by the SHA-256 digest of the URL only, so a later call
/// asking for a different count gets the first answer back. Concurrent misses
/// for one URL share a single summarizer call.
pub struct MemoizedCaptionGenerator<F> {
    summarize: F,
    memo: Cache<String, Vec<String>>,
}

impl<F> MemoizedCaptionGenerator<F>
where
    F: Fn(&SummarizeRequest) -> Result<Vec<String>, CaptionError> + Send + Sync,
{
    pub fn new(summarize: F) -> Self {
        Self::with_capacity(summarize, DEFAULT_MEMO_CAPACITY)
    }

    /// Remembers at most `capacity` URLs; zero is clamped to one.
    pub fn with_capacity(summarize: F, capacity: usize) -> Self {
        Self {
            summarize,
            memo: Cache::new(capacity.max(1) as u64),
        }
    }

    /// Number of memoized URLs after pending evictions are applied.
    pub fn memoized(&self) -> usize {
        self.memo.run_pending_tasks();
        self.memo.entry_count() as usize
    }
}

impl<F> CaptionGenerator for MemoizedCaptionGenerator<F>
where
    F: Fn(&SummarizeRequest) -> Result<Vec<String>, CaptionError> + Send + Sync,
{
    fn generate(&self, url: &str, count: usize) -> Result<Vec<String>, CaptionError> {
        let key = url_digest(url);
        if let Some(captions) = self.memo.get(&key) {
            info!("event=caption_generate module=caption status=hit");
            return Ok(captions);
        }

        info!("event=caption_generate module=caption status=miss count={count}");
        self.memo
            .try_get_with(key, || {
                (self.summarize)(&SummarizeRequest {
                    url: url.to_string(),
                    sentence_count: count,
                })
            })
            .map_err(|err| (*err).clone())
    }
}

fn url_digest(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::{CaptionError, CaptionGenerator, MemoizedCaptionGenerator, SummarizeRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn second_call_for_same_url_hits_memo() {
        let calls = AtomicUsize::new(0);
        let generator = MemoizedCaptionGenerator::new(|request: &SummarizeRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..request.sentence_count)
                .map(|index| format!("{} #{index}", request.url))
                .collect())
        });

        let first = generator.generate("http://x", 2).unwrap();
        let second = generator.generate("http://x", 2).unwrap();

        assert_eq!(first, vec!["http://x #0", "http://x #1"]);
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(generator.memoized(), 1);
    }

    #[test]
    fn upstream_errors_are_returned_and_not_memoized() {
        let generator = MemoizedCaptionGenerator::new(|_: &SummarizeRequest| {
            Err(CaptionError::Upstream("quota exceeded".to_string()))
        });

        let err = generator.generate("http://x", 3).unwrap_err();
        assert_eq!(err.to_string(), "summarizer failed: quota exceeded");
        assert_eq!(generator.memoized(), 0);
    }

    #[test]
    fn memo_stays_within_capacity() {
        let generator = MemoizedCaptionGenerator::with_capacity(
            |request: &SummarizeRequest| Ok(vec![request.url.clone()]),
            4,
        );

        for n in 0..50 {
            let url = format!("http://x/{n}");
            assert_eq!(generator.generate(&url, 1).unwrap(), vec![url]);
        }

        assert!(generator.memoized() <= 4);
    }

    #[test]
    fn concurrent_misses_share_one_summarizer_call() {
        let calls = AtomicUsize::new(0);
        let generator = MemoizedCaptionGenerator::new(|request: &SummarizeRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(vec![request.url.clone()])
        });

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    assert_eq!(generator.generate("http://x", 1).unwrap(), vec!["http://x"]);
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
