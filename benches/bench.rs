// Criterion benchmarks for Talent Algo

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use talent_algo::core::{
    build_recall_query, score_candidate, sort_ranked, RankedCandidate, ScoringConfig,
};
use talent_algo::models::{CandidateProfile, JobPosting, Location};
use chrono::Utc;

fn create_candidate(id: usize, skills: &[&str]) -> CandidateProfile {
    CandidateProfile {
        id: id.to_string(),
        full_name: format!("Candidate {}", id),
        email: None,
        location: Location {
            city: if id % 2 == 0 {
                Some("Paris".to_string())
            } else {
                Some("Lyon".to_string())
            },
            country: Some("France".to_string()),
            remote: None,
        },
        skills_declared: skills.iter().map(|s| s.to_string()).collect(),
        summary: "Data engineering and analytics".to_string(),
        experiences: vec![],
        education: vec![],
        languages: vec!["en".to_string()],
        profile_source: "form".to_string(),
        created_at: Utc::now(),
    }
}

fn create_job() -> JobPosting {
    JobPosting {
        id: "bench-job".to_string(),
        source: "jobspy".to_string(),
        url: None,
        title: "Senior Data Engineer".to_string(),
        company: Some("Acme".to_string()),
        location: Location {
            city: Some("Paris".to_string()),
            country: Some("France".to_string()),
            remote: Some("no".to_string()),
        },
        contract_type: None,
        seniority: Some("senior".to_string()),
        skills_required: vec![
            "python".to_string(),
            "sql".to_string(),
            "spark".to_string(),
            "airflow".to_string(),
        ],
        skills_nice: vec!["kubernetes".to_string()],
        description_text: String::new(),
        ingested_at: Utc::now(),
    }
}

fn skill_pool(id: usize) -> Vec<&'static str> {
    let all = ["python", "sql", "spark", "airflow", "aws", "docker", "etl"];
    all.iter().take(1 + id % all.len()).copied().collect()
}

fn bench_score_candidate(c: &mut Criterion) {
    let job = create_job();
    let candidate = create_candidate(0, &["python", "airflow", "docker"]);
    let config = ScoringConfig::default();

    c.bench_function("score_candidate", |b| {
        b.iter(|| score_candidate(black_box(&job), black_box(&candidate), black_box(&config)));
    });
}

fn bench_recall_query(c: &mut Criterion) {
    let job = create_job();

    c.bench_function("build_recall_query", |b| {
        b.iter(|| build_recall_query(black_box(&job)));
    });
}

fn bench_scoring_pool(c: &mut Criterion) {
    let job = create_job();
    let config = ScoringConfig::default();

    let mut group = c.benchmark_group("scoring");

    for pool_size in [10, 50, 100, 500, 1000].iter() {
        let pool: Vec<CandidateProfile> = (0..*pool_size)
            .map(|i| create_candidate(i, &skill_pool(i)))
            .collect();

        group.bench_with_input(
            BenchmarkId::new("score_pool", pool_size),
            pool_size,
            |b, _| {
                b.iter(|| {
                    let ranked: Vec<RankedCandidate> = pool
                        .iter()
                        .enumerate()
                        .map(|(idx, candidate)| {
                            let breakdown =
                                score_candidate(&job, candidate, black_box(&config));
                            RankedCandidate::new(idx, candidate.clone(), breakdown)
                        })
                        .collect();
                    black_box(ranked)
                });
            },
        );
    }

    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let job = create_job();
    let config = ScoringConfig::default();

    let ranked: Vec<RankedCandidate> = (0..1000)
        .map(|i| {
            let candidate = create_candidate(i, &skill_pool(i));
            let breakdown = score_candidate(&job, &candidate, &config);
            RankedCandidate::new(i, candidate, breakdown)
        })
        .collect();

    c.bench_function("sort_ranked_1000", |b| {
        b.iter(|| {
            let mut entries = ranked.clone();
            sort_ranked(&mut entries);
            black_box(entries)
        });
    });
}

criterion_group!(
    benches,
    bench_score_candidate,
    bench_recall_query,
    bench_scoring_pool,
    bench_ranking
);

criterion_main!(benches);
