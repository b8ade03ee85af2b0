//! Load test builder
use meshperf_core::{Field, LoadGenerator, LoadTestForm};
use std::time::Duration;
#[cfg(feature = "rt")]
use {
    meshperf_runtime::{MeshperfRuntime, RunOutcome, RuntimeError},
    std::future::{Future, IntoFuture},
    std::pin::Pin,
    tracing::Instrument,
};

/// Load test against a single endpoint.
///
/// Awaiting a `LoadTest` (requires `rt` feature) saves it as a performance profile, runs it and
/// follows the run until it ends.
#[derive(Default)]
pub struct LoadTest {
    form: LoadTestForm,
    #[cfg(feature = "rt")]
    runtime: Option<MeshperfRuntime>,
}

impl LoadTest {
    pub fn new(url: &str) -> Self {
        Self {
            form: LoadTestForm::new(url),
            ..Default::default()
        }
    }

    pub fn from_form(form: LoadTestForm) -> Self {
        Self {
            form,
            ..Default::default()
        }
    }

    pub fn form(&self) -> &LoadTestForm {
        &self.form
    }

    pub fn into_form(self) -> LoadTestForm {
        self.form
    }
}

cfg_rt! {
    impl LoadTest {
        /// Runtime used to reach the backend. Defaults to [`MeshperfRuntime::new`].
        pub fn runtime(mut self, runtime: MeshperfRuntime) -> Self {
            self.runtime = Some(runtime);
            self
        }
    }

    impl IntoFuture for LoadTest {
        type Output = Result<RunOutcome, RuntimeError>;
        type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

        fn into_future(self) -> Self::IntoFuture {
            let span = tracing::info_span!("load_test", url = %self.form.url);
            Box::pin(
                async move {
                    let mut orchestrator = self.runtime.unwrap_or_default().build()?;
                    *orchestrator.form_mut() = self.form;
                    orchestrator.run().await
                }
                .instrument(span),
            )
        }
    }
}

pub trait ConfigurableLoadTest: Sized {
    fn name(self, name: &str) -> Self;
    fn test_name(self, name: &str) -> Self;
    fn mesh(self, mesh: &str) -> Self;
    fn concurrency(self, concurrency: u32) -> Self;
    fn qps(self, qps: u32) -> Self;
    fn duration(self, duration: Duration) -> Self;
    fn load_generator(self, generator: LoadGenerator) -> Self;
    fn headers(self, headers: &str) -> Self;
    fn cookies(self, cookies: &str) -> Self;
    fn body(self, body: &str) -> Self;
    fn content_type(self, content_type: &str) -> Self;
    fn additional_options(self, options: &str) -> Self;
}

impl ConfigurableLoadTest for LoadTest {
    /// Name of the saved profile. Generated from the mesh and the current time when blank.
    fn name(mut self, name: &str) -> Self {
        self.form.set(Field::ProfileName, name);
        self
    }

    /// Name of the run. Generated like the profile name when blank.
    fn test_name(mut self, name: &str) -> Self {
        self.form.set(Field::TestName, name);
        self
    }

    fn mesh(mut self, mesh: &str) -> Self {
        self.form.set(Field::Mesh, mesh);
        self
    }

    fn concurrency(mut self, concurrency: u32) -> Self {
        self.form.set(Field::Concurrency, &concurrency.to_string());
        self
    }

    fn qps(mut self, qps: u32) -> Self {
        self.form.set(Field::Qps, &qps.to_string());
        self
    }

    /// Run for the given duration, in whole hours, minutes or seconds.
    ///
    /// Sub-second parts are dropped; a duration under one second is rejected when the load
    /// test is submitted.
    ///
    /// # Example
    /// ```
    /// use meshperf::prelude::*;
    /// use std::time::Duration;
    ///
    /// let test = LoadTest::new("http://x.test").duration(Duration::from_secs(120));
    /// assert_eq!(test.form().duration, "2m");
    /// ```
    fn duration(mut self, duration: Duration) -> Self {
        self.form.set(Field::Duration, &duration_field(duration));
        self
    }

    fn load_generator(mut self, generator: LoadGenerator) -> Self {
        self.form.load_generator = generator;
        self
    }

    fn headers(mut self, headers: &str) -> Self {
        self.form.set(Field::Headers, headers);
        self
    }

    fn cookies(mut self, cookies: &str) -> Self {
        self.form.set(Field::Cookies, cookies);
        self
    }

    fn body(mut self, body: &str) -> Self {
        self.form.set(Field::Body, body);
        self
    }

    fn content_type(mut self, content_type: &str) -> Self {
        self.form.set(Field::ContentType, content_type);
        self
    }

    /// Extra load generator options as a JSON document. Invalid JSON is flagged but still sent.
    fn additional_options(mut self, options: &str) -> Self {
        self.form.set(Field::AdditionalOptions, options);
        self
    }
}

fn duration_field(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        s if s > 0 && s % 3600 == 0 => format!("{}h", s / 3600),
        s if s > 0 && s % 60 == 0 => format!("{}m", s / 60),
        s => format!("{s}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_form() {
        let test = LoadTest::new("http://x.test")
            .name("checkout")
            .mesh("istio")
            .concurrency(10)
            .qps(5)
            .duration(Duration::from_secs(30))
            .load_generator(LoadGenerator::Nighthawk)
            .headers(r#"{"x-env":"test"}"#)
            .additional_options("{broken");

        let form = test.form();
        assert_eq!(form.url, "http://x.test");
        assert_eq!(form.profile_name, "checkout");
        assert_eq!(form.concurrency, "10");
        assert_eq!(form.qps, "5");
        assert_eq!(form.duration, "30s");
        assert_eq!(form.load_generator, LoadGenerator::Nighthawk);
        assert!(form.errors().additional_options.is_some());
    }

    #[test]
    fn edits_an_existing_form() {
        let mut form = LoadTestForm::new("http://bookinfo.local/productpage");
        form.set(Field::Qps, "7");

        let form = LoadTest::from_form(form).concurrency(3).into_form();
        assert_eq!(form.url, "http://bookinfo.local/productpage");
        assert_eq!(form.qps, "7");
        assert_eq!(form.concurrency, "3");
    }

    #[test]
    fn duration_units() {
        assert_eq!(duration_field(Duration::from_secs(7200)), "2h");
        assert_eq!(duration_field(Duration::from_secs(90)), "90s");
        assert_eq!(duration_field(Duration::from_secs(600)), "10m");
        assert_eq!(duration_field(Duration::from_millis(1500)), "1s");
        assert_eq!(duration_field(Duration::ZERO), "0s");
    }

    #[cfg(feature = "rt")]
    #[tokio::test]
    #[ntest::timeout(2000)]
    async fn rejects_invalid_duration_without_a_server() {
        use meshperf_core::SubmitError;
        use meshperf_runtime::MeshperfRuntime;

        let runtime = MeshperfRuntime::new().server("http://127.0.0.1:9".parse().unwrap());
        let res = LoadTest::new("http://x.test")
            .duration(Duration::from_millis(200))
            .runtime(runtime)
            .await;
        assert!(matches!(
            res,
            Err(RuntimeError::Submit(SubmitError::Invalid(_)))
        ));
    }
}
