//! AQT device implementation.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use marmot_hal::{
    Clock, Device, DeviceConfig, DeviceRegistry, HalError, HalResult, Job, PollPolicy,
    TokioClock,
};
use marmot_ir::{Operation, Wires};
use ndarray::Array2;
use tracing::{debug, info, instrument};

use crate::api::{
    Headers, HttpMethod, HttpTransport, JobSubmission, Transport, join_path, request_headers,
};
use crate::circuit::{Instruction, serialize};
use crate::error::{AqtError, AqtResult};
use crate::runner::JobRunner;
use crate::samples::decode_samples;
use crate::translate::{SUPPORTED_OPERATIONS, translate};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "AQT_TOKEN";

/// Deployed AQT endpoints, distinguished only by their path on the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AqtTarget {
    /// The gateway root.
    Base,
    /// Noiseless simulator.
    Simulator,
    /// Simulator with AQT's noise model.
    NoisySimulator,
}

impl AqtTarget {
    /// All targets.
    pub const ALL: [AqtTarget; 3] = [
        AqtTarget::Base,
        AqtTarget::Simulator,
        AqtTarget::NoisySimulator,
    ];

    /// Path appended to the gateway hostname.
    pub fn path(self) -> &'static str {
        match self {
            AqtTarget::Base => "",
            AqtTarget::Simulator => "sim",
            AqtTarget::NoisySimulator => "sim/noise-model-1",
        }
    }

    /// Human-readable device name.
    pub fn name(self) -> &'static str {
        match self {
            AqtTarget::Base => "Alpine Quantum Technologies device",
            AqtTarget::Simulator => "AQT Simulator device",
            AqtTarget::NoisySimulator => "AQT Noisy Simulator device",
        }
    }

    /// Registry name.
    pub fn short_name(self) -> &'static str {
        match self {
            AqtTarget::Base => "aqt.base_device",
            AqtTarget::Simulator => "aqt.sim",
            AqtTarget::NoisySimulator => "aqt.noisy_sim",
        }
    }

    /// Look a target up by registry name.
    pub fn from_short_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.short_name() == name)
    }
}

/// A Marmot device executing circuits on an AQT endpoint.
///
/// Each [`Device::apply`] lowers the circuit to AQT's native gates,
/// submits it and blocks the calling task until the job has finished.
///
/// # Authentication
///
/// The API key comes from [`DeviceConfig::api_key`] or, if that is unset,
/// from the `AQT_TOKEN` environment variable.
///
/// # Example
///
/// ```ignore
/// use marmot_adapter_aqt::{AqtDevice, AqtTarget};
/// use marmot_hal::{Device, DeviceConfig};
/// use marmot_ir::{Operation, Wires};
///
/// let config = DeviceConfig::default().with_api_key("my-key");
/// let mut device = AqtDevice::new(AqtTarget::Simulator, Wires::range(2), config)?;
/// let samples = device.execute(&[Operation::hadamard(0), Operation::cnot(0, 1)], &[]).await?;
/// ```
pub struct AqtDevice {
    target: AqtTarget,
    wires: Wires,
    shots: u32,
    base_url: String,
    hostname: String,
    api_key: Option<String>,
    headers: Headers,
    runner: JobRunner,
    circuit: Vec<Instruction>,
    circuit_json: String,
    samples: Option<Vec<u64>>,
    last_job: Option<Job>,
}

impl std::fmt::Debug for AqtDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AqtDevice")
            .field("target", &self.target)
            .field("wires", &self.wires)
            .field("shots", &self.shots)
            .field("hostname", &self.hostname)
            .field("api_key", &"[REDACTED]")
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

impl AqtDevice {
    /// Create a device talking to the gateway over HTTP.
    pub fn new(target: AqtTarget, wires: Wires, config: DeviceConfig) -> AqtResult<Self> {
        let transport = Arc::new(HttpTransport::new(config.request_timeout())?);
        Self::with_transport(
            target,
            wires,
            config,
            transport,
            Arc::new(TokioClock),
            |key| std::env::var(key).ok(),
        )
    }

    /// Create a device with an explicit transport, clock and environment.
    ///
    /// `env` maps variable names to values and is only consulted for the
    /// API key fallback.
    pub fn with_transport(
        target: AqtTarget,
        wires: Wires,
        config: DeviceConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        env: impl Fn(&str) -> Option<String>,
    ) -> AqtResult<Self> {
        config.validate()?;
        let method: HttpMethod = config.http_method.parse()?;
        let runner = JobRunner::new(transport, clock, config.poll_policy()?).with_method(method);

        let mut device = Self {
            target,
            wires,
            shots: config.shots,
            hostname: join_path(&config.base_url, target.path()),
            base_url: config.base_url,
            api_key: config.api_key,
            headers: Headers::new(),
            runner,
            circuit: Vec::new(),
            circuit_json: String::new(),
            samples: None,
            last_job: None,
        };
        device.set_api_configs_with(env)?;
        device.reset();
        Ok(device)
    }

    /// Resolve the API key and rebuild the headers and hostname.
    ///
    /// Falls back to `AQT_TOKEN` when no key was configured. Calling this
    /// again without changing the inputs leaves the device unchanged.
    pub fn set_api_configs(&mut self) -> AqtResult<()> {
        self.set_api_configs_with(|key| std::env::var(key).ok())
    }

    /// Like [`AqtDevice::set_api_configs`], reading variables from `env`.
    pub fn set_api_configs_with(&mut self, env: impl Fn(&str) -> Option<String>) -> AqtResult<()> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| env(API_KEY_ENV).filter(|key| !key.is_empty()))
            .ok_or(AqtError::MissingApiKey)?;

        self.headers = request_headers(&api_key);
        self.api_key = Some(api_key);
        self.hostname = join_path(&self.base_url, self.target.path());
        debug!("Configured {} at {}", self.target.short_name(), self.hostname);
        Ok(())
    }

    /// Register factories for the simulator targets.
    pub fn register(registry: &mut DeviceRegistry) {
        for target in [AqtTarget::Simulator, AqtTarget::NoisySimulator] {
            registry.register_factory(target.short_name(), move |wires, config| {
                let device = AqtDevice::new(target, wires, config)?;
                Ok(Box::new(device) as Box<dyn Device>)
            });
        }
    }

    /// The endpoint this device submits to.
    pub fn target(&self) -> AqtTarget {
        self.target
    }

    /// Full URL the device submits to.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Seconds to wait between status queries.
    pub fn retry_delay(&self) -> f64 {
        self.runner.policy().retry_delay().as_secs_f64()
    }

    /// Change the delay between status queries.
    ///
    /// Fails unless `secs` is positive; attempt and deadline limits are
    /// kept.
    pub fn set_retry_delay(&mut self, secs: f64) -> AqtResult<()> {
        let current = self.runner.policy();
        let mut policy = PollPolicy::from_secs_f64(secs)?;
        if let Some(attempts) = current.max_attempts() {
            policy = policy.with_max_attempts(attempts);
        }
        if let Some(deadline) = current.deadline() {
            policy = policy.with_deadline(deadline);
        }
        self.runner.set_policy(policy);
        Ok(())
    }

    /// Instructions of the last executed circuit.
    pub fn circuit(&self) -> &[Instruction] {
        &self.circuit
    }

    /// Serialized form of [`AqtDevice::circuit`].
    pub fn circuit_json(&self) -> &str {
        &self.circuit_json
    }

    /// Raw samples of the last finished job.
    pub fn raw_samples(&self) -> Option<&[u64]> {
        self.samples.as_deref()
    }

    /// The last finished job.
    pub fn last_job(&self) -> Option<&Job> {
        self.last_job.as_ref()
    }
}

#[async_trait]
impl Device for AqtDevice {
    fn name(&self) -> &str {
        self.target.name()
    }

    fn short_name(&self) -> &str {
        self.target.short_name()
    }

    fn wires(&self) -> &Wires {
        &self.wires
    }

    fn shots(&self) -> u32 {
        self.shots
    }

    fn operations(&self) -> BTreeSet<&'static str> {
        SUPPORTED_OPERATIONS.iter().copied().collect()
    }

    #[instrument(skip_all)]
    async fn apply(&mut self, operations: &[Operation], rotations: &[Operation]) -> HalResult<()> {
        self.reset();
        self.circuit = translate(operations, rotations, &self.wires)?;
        self.circuit_json = serialize(&self.circuit)?;

        let api_key = self.api_key.as_deref().ok_or(AqtError::MissingApiKey)?;
        let submission = JobSubmission {
            access_token: api_key,
            no_qubits: self.wires.len(),
            repetitions: self.shots,
            data: &self.circuit_json,
        };
        let job = self
            .runner
            .execute(&self.hostname, &self.headers, &submission)
            .await?;

        info!(
            "Executed {} instructions on {} ({} shots)",
            self.circuit.len(),
            self.target.short_name(),
            self.shots
        );
        self.samples = job.samples.clone();
        self.last_job = Some(job);
        Ok(())
    }

    fn generate_samples(&self) -> HalResult<Array2<u8>> {
        let samples = self.samples.as_deref().ok_or_else(|| {
            HalError::NoSamples(format!("{} has not executed a circuit", self.target.name()))
        })?;
        Ok(decode_samples(samples, self.wires.len())?)
    }

    fn reset(&mut self) {
        self.circuit.clear();
        self.circuit_json.clear();
        self.samples = None;
        self.last_job = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use std::time::Duration;

    use marmot_hal::ManualClock;
    use marmot_ir::WireLabel;

    use crate::api::API_KEY_HEADER;
    use crate::test_support::ScriptedTransport;

    const SOME_API_KEY: &str = "ABC123";

    fn device_with(
        target: AqtTarget,
        wires: Wires,
        config: DeviceConfig,
        transport: Arc<ScriptedTransport>,
    ) -> AqtResult<AqtDevice> {
        AqtDevice::with_transport(
            target,
            wires,
            config,
            transport,
            Arc::new(ManualClock::new()),
            |_| None,
        )
    }

    fn device(num_wires: u32, transport: Arc<ScriptedTransport>) -> AqtDevice {
        let config = DeviceConfig::default()
            .with_api_key(SOME_API_KEY)
            .with_shots(10);
        device_with(AqtTarget::Simulator, Wires::range(num_wires), config, transport).unwrap()
    }

    #[test]
    fn test_target_metadata() {
        assert_eq!(AqtTarget::Simulator.short_name(), "aqt.sim");
        assert_eq!(AqtTarget::NoisySimulator.path(), "sim/noise-model-1");
        assert_eq!(AqtTarget::Base.path(), "");
        assert_eq!(AqtTarget::from_short_name("aqt.noisy_sim"), Some(AqtTarget::NoisySimulator));
        assert_eq!(AqtTarget::from_short_name("aqt.qpu"), None);
    }

    #[test]
    fn test_hostname_per_target() {
        let transport = ScriptedTransport::new([]);
        let config = DeviceConfig::default().with_api_key(SOME_API_KEY);
        let sim = device_with(AqtTarget::Simulator, Wires::range(1), config.clone(), transport.clone())
            .unwrap();
        assert_eq!(sim.hostname(), "https://gateway.aqt.eu/marmot/sim");

        let noisy = device_with(AqtTarget::NoisySimulator, Wires::range(1), config.clone(), transport.clone())
            .unwrap();
        assert_eq!(noisy.hostname(), "https://gateway.aqt.eu/marmot/sim/noise-model-1");
        assert_eq!(noisy.name(), "AQT Noisy Simulator device");

        let base = device_with(AqtTarget::Base, Wires::range(1), config, transport).unwrap();
        assert_eq!(base.hostname(), "https://gateway.aqt.eu/marmot/");
    }

    #[test]
    fn test_headers_carry_api_key() {
        let device = device(2, ScriptedTransport::new([]));
        assert_eq!(
            device.headers().get(API_KEY_HEADER).map(String::as_str),
            Some(SOME_API_KEY)
        );
        assert_eq!(device.headers().get("SDK").map(String::as_str), Some("marmot"));
    }

    #[test]
    fn test_api_key_falls_back_to_env() {
        let device = AqtDevice::with_transport(
            AqtTarget::Simulator,
            Wires::range(1),
            DeviceConfig::default(),
            ScriptedTransport::new([]),
            Arc::new(ManualClock::new()),
            |key| (key == API_KEY_ENV).then(|| "from-env".to_string()),
        )
        .unwrap();
        assert_eq!(
            device.headers().get(API_KEY_HEADER).map(String::as_str),
            Some("from-env")
        );
    }

    #[test]
    fn test_missing_api_key() {
        let err = device_with(
            AqtTarget::Simulator,
            Wires::range(1),
            DeviceConfig::default().with_api_key(""),
            ScriptedTransport::new([]),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "No valid api key for AQT platform found.");
    }

    #[test]
    fn test_set_api_configs_is_idempotent() {
        let mut device = device(2, ScriptedTransport::new([]));
        let (headers, hostname) = (device.headers().clone(), device.hostname().to_string());
        device.set_api_configs_with(|_| Some("other".into())).unwrap();
        device.set_api_configs_with(|_| None).unwrap();
        assert_eq!(device.headers(), &headers);
        assert_eq!(device.hostname(), hostname);
    }

    #[test]
    fn test_zero_shots_rejected() {
        let config = DeviceConfig::default().with_api_key(SOME_API_KEY).with_shots(0);
        let err = device_with(AqtTarget::Simulator, Wires::range(1), config, ScriptedTransport::new([]))
            .unwrap_err();
        assert!(err.to_string().contains("analytic"));
    }

    #[test]
    fn test_invalid_http_method_rejected() {
        let config = DeviceConfig::default()
            .with_api_key(SOME_API_KEY)
            .with_http_method("GET");
        let err = device_with(AqtTarget::Simulator, Wires::range(1), config, ScriptedTransport::new([]))
            .unwrap_err();
        assert!(matches!(err, AqtError::InvalidHttpMethod(_)));
    }

    #[test]
    fn test_retry_delay() {
        let mut device = device(1, ScriptedTransport::new([]));
        assert!((device.retry_delay() - 1.0).abs() < f64::EPSILON);

        device.set_retry_delay(0.25).unwrap();
        assert!((device.retry_delay() - 0.25).abs() < f64::EPSILON);

        let err = device.set_retry_delay(-5.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: The specified retry delay needs to be positive. Got -5."
        );
        assert!((device.retry_delay() - 0.25).abs() < f64::EPSILON);

        assert!(matches!(
            device.set_retry_delay(1e20),
            Err(AqtError::Configuration(_))
        ));
        assert!((device.retry_delay() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_retry_delay_keeps_limits() {
        let config = DeviceConfig::default()
            .with_api_key(SOME_API_KEY)
            .with_max_poll_attempts(4);
        let mut device =
            device_with(AqtTarget::Simulator, Wires::range(1), config, ScriptedTransport::new([]))
                .unwrap();
        device.set_retry_delay(2.0).unwrap();
        assert_eq!(device.runner.policy().max_attempts(), Some(4));
        assert_eq!(device.runner.policy().retry_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_operations() {
        let device = device(1, ScriptedTransport::new([]));
        let ops = device.operations();
        assert_eq!(ops.len(), 12);
        for name in ["RX", "RY", "RZ", "R", "MS", "CNOT", "BasisState", "S", "Hadamard"] {
            assert!(ops.contains(name), "{name}");
        }
        assert!(device.supports_operation("RX.inv"));
        assert!(!device.supports_operation("Toffoli"));
    }

    #[tokio::test]
    async fn test_apply_submits_serialized_circuit() {
        let transport = ScriptedTransport::new([
            (200, r#"{"id": 1, "status": "queued"}"#),
            (200, r#"{"id": 1, "status": "finished", "samples": [1, 2, 3]}"#),
        ]);
        let mut device = device(2, transport.clone());

        device
            .apply(&[Operation::rx(PI / 2.0, 0), Operation::ms(0.5, 0, 1)], &[])
            .await
            .unwrap();

        assert_eq!(device.circuit_json(), r#"[["X",0.5,[0]],["MS",0.5,[0,1]]]"#);
        assert_eq!(device.raw_samples(), Some(&[1u64, 2, 3][..]));
        assert_eq!(device.last_job().map(|job| job.polls), Some(1));

        let requests = transport.requests();
        let submission = &requests[0];
        assert_eq!(submission.url, "https://gateway.aqt.eu/marmot/sim");
        assert_eq!(submission.method, HttpMethod::Put);
        assert_eq!(submission.body["access_token"], SOME_API_KEY);
        assert_eq!(submission.body["no_qubits"], 2);
        assert_eq!(submission.body["repetitions"], 10);
        assert_eq!(submission.body["data"], device.circuit_json());
        assert_eq!(
            submission.headers.get(API_KEY_HEADER).map(String::as_str),
            Some(SOME_API_KEY)
        );
        assert_eq!(
            requests[1].body,
            serde_json::json!({"id": 1, "access_token": SOME_API_KEY})
        );
    }

    #[tokio::test]
    async fn test_apply_maps_custom_wire_labels() {
        let transport = ScriptedTransport::new([(
            200,
            r#"{"id": 1, "status": "finished", "samples": [0]}"#,
        )]);
        let wires = Wires::new([WireLabel::from("a"), WireLabel::from("b")]).unwrap();
        let config = DeviceConfig::default().with_api_key(SOME_API_KEY);
        let mut device = device_with(AqtTarget::Simulator, wires, config, transport).unwrap();

        device.apply(&[Operation::pauli_x("b")], &[]).await.unwrap();
        assert_eq!(device.circuit_json(), r#"[["X",1.0,[1]]]"#);
    }

    #[tokio::test]
    async fn test_apply_fails_before_network_on_bad_order() {
        let transport = ScriptedTransport::new([]);
        let mut device = device(2, transport.clone());
        let ops = [Operation::hadamard(0), Operation::basis_state(&[1, 1], [0, 1])];

        let err = device.apply(&ops, &[]).await.unwrap_err();
        assert!(matches!(err, HalError::OperationOrder(ref name) if name == "BasisState"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_apply_unsupported_operation() {
        let transport = ScriptedTransport::new([]);
        let mut device = device(3, transport.clone());
        let err = device
            .apply(&[Operation::new("Toffoli", [0, 1, 2])], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::UnsupportedOperation(ref name) if name == "Toffoli"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_generate_samples_and_reset() {
        let transport = ScriptedTransport::new([(
            200,
            r#"{"id": 1, "status": "finished", "samples": [4, 1, 6]}"#,
        )]);
        let mut device = device(3, transport);
        device.apply(&[Operation::pauli_x(0)], &[]).await.unwrap();

        let samples = device.generate_samples().unwrap();
        assert_eq!(samples.row(0).to_vec(), vec![0, 0, 1]);
        assert_eq!(samples.row(1).to_vec(), vec![1, 0, 0]);
        assert_eq!(samples.row(2).to_vec(), vec![0, 1, 1]);

        device.reset();
        assert!(device.circuit().is_empty());
        assert!(device.circuit_json().is_empty());
        assert!(device.raw_samples().is_none());
        assert!(matches!(device.generate_samples(), Err(HalError::NoSamples(_))));
    }

    #[tokio::test]
    async fn test_failed_apply_discards_previous_results() {
        let transport = ScriptedTransport::new([(
            200,
            r#"{"id": 1, "status": "finished", "samples": [3, 3]}"#,
        )]);
        let mut device = device(2, transport);
        device
            .apply(&[Operation::pauli_x(0), Operation::pauli_x(1)], &[])
            .await
            .unwrap();
        assert_eq!(device.raw_samples(), Some(&[3, 3][..]));

        let err = device
            .apply(&[Operation::new("Toffoli", [0, 1, 0])], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::UnsupportedOperation(_)));
        assert!(device.circuit_json().is_empty());
        assert!(device.last_job().is_none());
        assert!(matches!(device.generate_samples(), Err(HalError::NoSamples(_))));
    }

    #[test]
    fn test_register_simulators() {
        let mut registry = DeviceRegistry::new();
        AqtDevice::register(&mut registry);
        assert_eq!(registry.available_devices(), vec!["aqt.noisy_sim", "aqt.sim"]);
    }
}
