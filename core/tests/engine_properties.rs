use search_core::{
    process_queries, remove_duplicates, Document, DocumentId, DocumentStatus, ErrorKind, ExecutionPolicy,
    RequestQueue, SearchServer, MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_EPSILON,
};

const TEXTS: &[&str] = &[
    "white cat and fancy collar",
    "fluffy cat fluffy tail",
    "groomed dog expressive eyes",
    "groomed starling eugene",
    "curly cat curly tail",
    "curly dog and fancy collar",
    "big cat fancy collar",
    "big dog sparrow eugene",
    "big dog sparrow vasiliy",
    "nasty rat with curly hair",
    "funny pet and nasty rat",
    "pet with rat and rat and rat",
];

fn server() -> SearchServer {
    let mut server = SearchServer::from_stop_words_text("and in on with").unwrap();
    for (id, text) in TEXTS.iter().enumerate() {
        let id = id as DocumentId;
        let status = if id % 5 == 4 { DocumentStatus::Irrelevant } else { DocumentStatus::Actual };
        server.add_document(id, text, status, &[id, -2, 3]).unwrap();
    }
    server
}

fn ids(docs: &[Document]) -> Vec<DocumentId> {
    docs.iter().map(|d| d.id).collect()
}

#[test]
fn frequencies_sum_to_one_without_stop_words() {
    let server = server();
    for id in server.iter() {
        let freqs = server.word_frequencies(id);
        let sum: f64 = freqs.values().sum();
        assert!((sum - 1.0).abs() < 1e-9, "document {id} sums to {sum}");
        assert!(!freqs.contains_key("and") && !freqs.contains_key("with"));
    }
    assert!(server.word_frequencies(100).is_empty());
}

#[test]
fn stop_words_never_match() {
    let server = server();
    assert!(server.find_top_documents("and with").unwrap().is_empty());
    assert_eq!(server.match_document("and cat", 0).unwrap().0, vec!["cat"]);
}

#[test]
fn minus_words_exclude_under_any_predicate() {
    let server = server();
    let found = server
        .find_top_documents_with(ExecutionPolicy::parallel(), "cat dog rat -collar", |_: DocumentId, _: DocumentStatus, _: i32| true)
        .unwrap();
    assert!(!found.is_empty());
    for doc in &found {
        assert!(!server.word_frequencies(doc.id).contains_key("collar"));
    }
}

#[test]
fn results_are_bounded_and_sorted() {
    let server = server();
    let found = server
        .find_top_documents_with(ExecutionPolicy::Sequential, "cat dog curly big rat", |_: DocumentId, _: DocumentStatus, _: i32| true)
        .unwrap();
    assert_eq!(found.len(), MAX_RESULT_DOCUMENT_COUNT);
    for pair in found.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if (a.relevance - b.relevance).abs() < RELEVANCE_EPSILON {
            assert!(a.rating >= b.rating);
        } else {
            assert!(a.relevance > b.relevance);
        }
    }
}

#[test]
fn parallel_ranking_is_identical() {
    let server = server();
    let queries = ["cat dog curly big rat", "fancy collar -big", "sparrow eugene groomed", "rat -pet", "tail"];
    for query in queries {
        for status in [DocumentStatus::Actual, DocumentStatus::Irrelevant] {
            let seq = server.find_top_documents_with(ExecutionPolicy::Sequential, query, status).unwrap();
            let par = server.find_top_documents_with(ExecutionPolicy::Parallel { workers: 4 }, query, status).unwrap();
            assert_eq!(seq.len(), par.len());
            for (s, p) in seq.iter().zip(&par) {
                assert_eq!(s.id, p.id);
                assert_eq!(s.relevance.to_bits(), p.relevance.to_bits());
                assert_eq!(s.rating, p.rating);
            }
        }
    }
}

#[test]
fn fluffy_document_outranks_plain_cat() {
    let mut server = SearchServer::from_stop_words_text("and").unwrap();
    server.add_document(0, "white cat and fancy collar", DocumentStatus::Actual, &[8, -3]).unwrap();
    server.add_document(1, "fluffy cat fluffy tail", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
    let found = server.find_top_documents("fluffy well-groomed cat").unwrap();
    assert_eq!(ids(&found), vec![1, 0]);
}

#[test]
fn add_rejects_negative_and_duplicate_ids() {
    let mut server = SearchServer::default();
    let err = server.add_document(-1, "x", DocumentStatus::Actual, &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    server.add_document(5, "x", DocumentStatus::Actual, &[]).unwrap();
    let err = server.add_document(5, "y", DocumentStatus::Actual, &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(server.document_count(), 1);
}

#[test]
fn removal_adjusts_count_and_results() {
    for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::parallel()] {
        let mut server = server();
        let before = server.document_count();
        server.remove_document_with(policy, 1);
        assert_eq!(server.document_count(), before - 1);
        server.remove_document_with(policy, 1);
        server.remove_document_with(policy, 1000);
        assert_eq!(server.document_count(), before - 1);
        assert!(!ids(&server.find_top_documents("fluffy cat tail").unwrap()).contains(&1));
        assert!(server.word_frequencies(1).is_empty());
        assert!(server.match_document("cat", 1).is_err());
    }
}

#[test]
fn dedup_removes_later_id_with_same_word_set() {
    let mut server = SearchServer::default();
    server.add_document(3, "rat rat pet", DocumentStatus::Actual, &[1]).unwrap();
    server.add_document(8, "pet rat pet", DocumentStatus::Banned, &[9]).unwrap();
    server.add_document(5, "pet", DocumentStatus::Actual, &[]).unwrap();
    assert_eq!(remove_duplicates(&mut server), vec![8]);
    assert_eq!(server.iter().collect::<Vec<_>>(), vec![3, 5]);
}

#[test]
fn request_window_after_1441_calls() {
    let server = server();
    let mut queue = RequestQueue::new(&server);
    let mut outcomes = Vec::new();
    for i in 0..1441 {
        let query = if i % 3 == 0 { "cat" } else { "unicorn" };
        let found = queue.add_find_request(query).unwrap();
        outcomes.push(found.is_empty());
    }
    assert_eq!(queue.window().len(), 1440);
    let expected = outcomes[1..].iter().filter(|&&empty| empty).count();
    assert_eq!(queue.no_result_requests(), expected);
}

#[test]
fn batch_matches_individual_queries() {
    let server = server();
    let queries = vec!["cat".to_string(), "dog -big".to_string(), "nothing here".to_string()];
    let results = process_queries(&server, &queries[..]).unwrap();
    assert_eq!(results[0], server.find_top_documents("cat").unwrap());
    assert_eq!(results[1], server.find_top_documents("dog -big").unwrap());
    assert!(results[2].is_empty());
}
