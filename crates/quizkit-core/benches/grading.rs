use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizkit_core::config::ValidationConfig;
use quizkit_core::model::{Answer, Quiz, UserResponse};
use quizkit_core::schema::validate_value;
use quizkit_core::evaluate;
use quizkit_core::scoring::aggregate_score;
use serde_json::json;

fn make_quiz(questions: usize) -> Quiz {
    let questions: Vec<_> = (0..questions)
        .map(|i| match i % 3 {
            0 => json!({
                "id": format!("q{i}"), "type": "multiple-choice", "text": "?",
                "options": ["A", "B", "C", "D"], "correctAnswer": ["A", "C"], "points": 2
            }),
            1 => json!({
                "id": format!("q{i}"), "type": "true-false", "text": "?",
                "correctAnswer": "true", "points": 1
            }),
            _ => json!({
                "id": format!("q{i}"), "type": "short-answer", "text": "?",
                "validationRegex": "^[0-9]+$", "correctAnswer": "42"
            }),
        })
        .collect();
    validate_value(
        json!({ "title": "bench", "questions": questions }),
        &ValidationConfig::default(),
    )
    .unwrap()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let quiz = make_quiz(3);
    let (set_q, tf_q, pattern_q) = match quiz.questions() {
        [a, b, c] => (a, b, c),
        _ => unreachable!("make_quiz(3) builds three questions"),
    };

    let set_answer: Answer = vec!["C", "A", "C"].into();
    group.bench_function("set", |b| {
        b.iter(|| evaluate(black_box(set_q), black_box(&set_answer)))
    });

    let tf_answer: Answer = "true".into();
    group.bench_function("true_false", |b| {
        b.iter(|| evaluate(black_box(tf_q), black_box(&tf_answer)))
    });

    let pattern_answer: Answer = " 12345 ".into();
    group.bench_function("pattern", |b| {
        b.iter(|| evaluate(black_box(pattern_q), black_box(&pattern_answer)))
    });

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_score");

    for size in [10usize, 100, 1000] {
        let quiz = make_quiz(size);
        let responses: Vec<UserResponse> = quiz
            .questions()
            .iter()
            .enumerate()
            .map(|(i, q)| UserResponse {
                question_id: q.id.clone(),
                selected_answer: Answer::Single("x".into()),
                is_correct: i % 2 == 0,
            })
            .collect();

        group.bench_function(format!("n={size}"), |b| {
            b.iter(|| aggregate_score(black_box(quiz.questions()), black_box(&responses)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_aggregate);
criterion_main!(benches);
