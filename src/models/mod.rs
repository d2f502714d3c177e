// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    normalize_skills, CandidateProfile, Education, Experience, JobKey, JobPosting, Location,
    MatchRecord, UpsertOutcome,
};
pub use requests::{
    CandidateIn, GetMatchesQuery, JobIngestPayload, JobPostingIn, RunMatchQuery, UploadCvQuery,
};
pub use responses::{
    CreateCandidateResponse, ErrorResponse, HealthResponse, IngestResponse, MatchListResponse,
    RunMatchResponse,
};
