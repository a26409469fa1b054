pub mod bulk_job;
pub mod candidate;
pub mod candidate_matrix;
pub mod job;
pub mod job_matrix;
pub mod match_record;
