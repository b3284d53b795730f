//! # deep-research
//!
//! Multi-agent deep research: an orchestrating agent delegates planning,
//! web search, reflection, synthesis and report writing to specialised
//! agents exposed as tools, and returns a cited report.
//!
//! ## Resource control
//!
//! - Web searches share one [`RateLimiter`](search::RateLimiter); calls
//!   start at least six seconds apart by default.
//! - Top-level runs go through a [`RetryingInvoker`](agent::RetryingInvoker)
//!   that backs off exponentially on provider rate limits.
//! - The orchestrator is bounded by a turn ceiling and a hard ceiling on
//!   delegations. Running out of turns yields a best-effort report rather
//!   than an error.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use deep_research::agent::client::create_provider;
//! use deep_research::agent::{Orchestrator, PromptSet, ResearchConfig};
//! use deep_research::clock::{Clock, SystemClock};
//! use deep_research::search::{RateLimiter, create_search_provider};
//!
//! # async fn demo() -> deep_research::Result<()> {
//! let config = ResearchConfig::from_env()?;
//! let provider = create_provider(&config)?;
//! let search = create_search_provider(&config)?;
//! let clock: Arc<dyn Clock> = Arc::new(SystemClock);
//! // One limiter per process, shared by every orchestrator.
//! let limiter = Arc::new(RateLimiter::new(config.search_interval, Arc::clone(&clock)));
//! let orchestrator = Orchestrator::from_config(
//!     &config,
//!     Arc::from(provider),
//!     Arc::from(search),
//!     limiter,
//!     &PromptSet::load(config.prompt_dir.as_deref()),
//!     clock,
//! );
//! let report = orchestrator.research("Lead generation for consultancies").await?;
//! println!("{}", report.text);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod clock;
pub mod error;
pub mod search;
pub mod tools;

pub use error::{AgentError, CommandError, Error, Result, SearchError};
