//! Academic timetabling for the U-Engine ecosystem.
//!
//! Builds semester timetables for classes of study programs in two phases:
//! a genetic algorithm optimizes one representative week, then the best
//! week is projected onto every calendar week of the semester and clashes
//! with date-specific constraints are repaired by a bounded search.
//!
//! # Modules
//!
//! - **`models`**: Input records: `Class`, `Program`, `Semester`, `Subject`,
//!   `Lecturer`, `Room`, `TimeSlot`, calendar arithmetic
//! - **`data`**: Index-addressed lookup tables and weekly lesson requirements
//! - **`ga`**: Chromosome, fitness, operators and the generational runner
//! - **`expansion`**: Semester expansion, occupancy tracking, conflict repair
//! - **`scheduler`**: Per-semester orchestration and KPIs
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling references)
//! - **`config`** / **`error`**: Run configuration and error types
//!
//! # Example
//!
//! ```no_run
//! use u_timetable::config::TimetableConfig;
//! use u_timetable::models::TimetableInput;
//! use u_timetable::scheduler::TimetableScheduler;
//!
//! let input: TimetableInput = serde_json::from_str("{}").unwrap();
//! let scheduler = TimetableScheduler::new(input, TimetableConfig::default()).unwrap();
//! for (semester, result) in scheduler.run_all() {
//!     match result {
//!         Ok(outcome) => println!("semester {semester}: {} lessons", outcome.kpi.committed),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"

pub mod config;
pub mod data;
pub mod error;
pub mod expansion;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;
