mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;

    use meshperf::prelude::*;
    use meshperf::{
        generate_uuid, ChannelSlot, Field, PushChannel, RunRequest, RuntimeError, SubmitError,
        MSG_DISCONNECTED, MSG_RESULT_FETCHED, MSG_TEST_SUBMITTED,
    };
    use ntest::timeout;

    #[tokio::test]
    #[timeout(5000)]
    async fn successful_run() {
        let metrics = init();
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://x.test");

        let outcome = orchestrator.run().await.unwrap();
        let RunOutcome::Completed(result) = outcome else {
            panic!("expected a completed run, got {outcome:?}");
        };
        assert!(result.has_runner_results());
        assert_eq!(result.runner_results.as_ref().unwrap()["NumThreads"], "10");

        let session = orchestrator.session();
        assert_eq!(session.phase(), Phase::ShowingResults);
        assert!(session.phase().results_visible());
        assert!(session.phase().submit_enabled());
        assert!(!orchestrator.is_streaming());
        assert_eq!(session.result(), Some(&result));

        let record = session.last_load_test().unwrap();
        assert_eq!(record.url, "http://x.test");
        assert_eq!(record.mesh_name, "istio");
        assert!(record.test_name.starts_with("istio_"));

        let queries = mock.state().run_queries();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].starts_with("cert=true&name=istio_"), "{}", queries[0]);
        assert!(queries[0].contains("c=10&qps=5&t=30&dur=s"), "{}", queries[0]);
        // A fresh token is generated for the next run.
        let sent_uuid = format!("uuid={}", session.test_uuid());
        assert!(!queries[0].contains(&sent_uuid));

        for (event_type, message) in [
            (EventType::Success, "has been created"),
            (EventType::Success, MSG_TEST_SUBMITTED),
            (EventType::Info, "Initiating load test"),
            (EventType::Success, MSG_RESULT_FETCHED),
        ] {
            assert!(notifier.contains(event_type, message), "missing {message}");
        }
        let fetched = notifier
            .history()
            .iter()
            .filter(|n| n.message == MSG_RESULT_FETCHED)
            .count();
        assert_eq!(fetched, 1);

        let url = orchestrator.result_url().unwrap();
        assert!(url.path().starts_with("/api/perf/profile/result/"));
        let raw = orchestrator.download_result().await.unwrap();
        assert!(String::from_utf8_lossy(&raw).contains("meshery_id"));

        orchestrator.close_results();
        assert_eq!(orchestrator.phase(), Phase::Idle);
        assert!(orchestrator.session().result().is_some());

        assert!(metrics.render().contains("meshperf_run_started"));
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn contexts_precede_run_parameters() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = runtime(&mock, &notifier)
            .context("ctx-a")
            .context("ctx-b")
            .build()
            .unwrap();
        fill_form(&mut orchestrator, "http://x.test");
        orchestrator.form_mut().set(Field::TestName, "smoke");

        orchestrator.run().await.unwrap();
        let queries = mock.state().run_queries();
        assert!(
            queries[0].starts_with("contexts=ctx-a&contexts=ctx-b&cert=true&name=smoke&mesh=istio&"),
            "{}",
            queries[0]
        );
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn second_run_reuses_profile() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://x.test");

        orchestrator.run().await.unwrap();
        let first_name = orchestrator.session().form().test_name.clone();
        orchestrator.run().await.unwrap();

        assert_eq!(mock.state().profile_count(), 1);
        assert_eq!(mock.state().run_queries().len(), 2);
        assert_eq!(orchestrator.session().form().test_name, first_name);
        let saves = notifier
            .history()
            .iter()
            .filter(|n| n.message.ends_with("has been created"))
            .count();
        assert_eq!(saves, 1);
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn error_event_returns_to_idle() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://fail.test");

        let outcome = orchestrator.run().await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Failed("unable to reach the target".to_string())
        );
        let phase = orchestrator.phase();
        assert_eq!(phase, Phase::Idle);
        assert!(phase.submit_enabled());
        assert!(!phase.running());
        assert!(!orchestrator.is_streaming());
        assert!(notifier.contains(
            EventType::Error,
            "Load test did not run with msg: unable to reach the target"
        ));
        assert!(orchestrator.session().result().is_none());
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn dropped_stream_keeps_previous_results() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://x.test");
        orchestrator.run().await.unwrap();
        let previous = orchestrator.session().result().cloned();

        orchestrator.form_mut().set(Field::Url, "http://drop.test");
        let outcome = orchestrator.run().await.unwrap();
        assert!(matches!(outcome, RunOutcome::Disconnected(_)));
        assert_eq!(orchestrator.phase(), Phase::Idle);
        assert!(notifier.contains(EventType::Warning, MSG_DISCONNECTED));
        assert_eq!(orchestrator.session().result().cloned(), previous);
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn success_without_runner_results() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://empty.test");

        assert_eq!(orchestrator.run().await.unwrap(), RunOutcome::NoResults);
        assert_eq!(orchestrator.phase(), Phase::Idle);
        assert!(orchestrator.session().result().is_none());
        assert!(!notifier.contains(EventType::Success, MSG_RESULT_FETCHED));
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn invalid_duration_sends_nothing() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://x.test");
        orchestrator.form_mut().set(Field::Duration, "abc");

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Submit(SubmitError::Invalid(_))
        ));
        assert!(orchestrator.session().form().errors().duration.is_some());
        assert_eq!(mock.state().profile_count(), 0);
        assert!(mock.state().run_queries().is_empty());
        assert!(notifier.history().is_empty());
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn running_indicator_and_teardown() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://slow.test");

        orchestrator.submit().await.unwrap();
        assert_eq!(orchestrator.phase(), Phase::Streaming { announced: false });
        assert!(!orchestrator.phase().running());
        assert!(matches!(
            orchestrator.submit().await,
            Err(RuntimeError::Submit(SubmitError::Busy))
        ));

        let phase = orchestrator.next_update().await.unwrap();
        assert!(phase.running());
        assert!(orchestrator.is_streaming());
        assert!(eventually(|| mock.state().active_streams() == 1).await);

        drop(orchestrator);
        assert!(eventually(|| mock.state().active_streams() == 0).await);
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn new_stream_closes_previous() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://slow.test");
        let id = orchestrator.save_profile().await.unwrap().id.unwrap();

        let form = orchestrator.session().form().clone();
        let request = RunRequest::new(&form, "slow", "30s".parse().unwrap(), generate_uuid());
        let client = orchestrator.client();

        let mut slot = ChannelSlot::new();
        let first = client.open_run_stream(&id, &request).await.unwrap();
        slot.replace(PushChannel::open(first.bytes_stream())).await;
        assert!(eventually(|| mock.state().active_streams() == 1).await);

        let second = client.open_run_stream(&id, &request).await.unwrap();
        slot.replace(PushChannel::open(second.bytes_stream())).await;

        // The first stream is torn down by the replace alone.
        assert_eq!(mock.state().run_queries().len(), 2);
        assert!(eventually(|| mock.state().active_streams() == 1).await);
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert_eq!(mock.state().active_streams(), 1);
        assert!(slot.is_open());
    }
}
