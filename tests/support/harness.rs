//! Engine wired to scripted collaborators and a temporary SQLite store.

use std::sync::Arc;

use kyute::adapter::outbound::execution::StrategyKind;
use kyute::adapter::outbound::sqlite::{self, SqliteAuditSink};
use kyute::application::{DecisionEngine, EngineSettings, HedgeOrchestrator, HedgeSettings};
use kyute::port::outbound::assessor::RiskAssessor;
use kyute::port::outbound::audit::AuditSinkSet;
use kyute::testkit::config::{engine_settings, hedge_settings, ETH_MARKET};
use kyute::testkit::{FailingAuditSink, RecordingAuditSink, ScriptedAssessor, ScriptedRateSource, ScriptedVault};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Temporary SQLite database, removed on drop.
pub struct TempDb {
    _dir: TempDir,
    path: String,
    store: SqliteAuditSink,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("audit.db").to_string_lossy().to_string();
        let pool = sqlite::open(&path).expect("open sqlite store");
        Self {
            _dir: dir,
            path,
            store: SqliteAuditSink::new(pool),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn store(&self) -> &SqliteAuditSink {
        &self.store
    }
}

pub struct Harness {
    pub engine: DecisionEngine,
    pub fixed: Arc<ScriptedRateSource>,
    pub floating: Arc<ScriptedRateSource>,
    pub vault: Arc<ScriptedVault>,
    pub recorder: RecordingAuditSink,
    pub db: TempDb,
}

pub struct HarnessBuilder {
    fixed: Decimal,
    floating: Decimal,
    assessor: Option<Arc<dyn RiskAssessor>>,
    vault: ScriptedVault,
    settings: EngineSettings,
    hedge: HedgeSettings,
    fallback: Option<StrategyKind>,
    failing_sink: bool,
}

impl HarnessBuilder {
    pub fn new(fixed: Decimal, floating: Decimal) -> Self {
        Self {
            fixed,
            floating,
            assessor: Some(Arc::new(ScriptedAssessor::returning(85, "High reversion risk"))),
            vault: ScriptedVault::funded(ETH_MARKET, Decimal::ONE),
            settings: engine_settings(),
            hedge: hedge_settings(&[("ETH", ETH_MARKET)]),
            fallback: Some(StrategyKind::VaultRecord),
            failing_sink: false,
        }
    }

    pub fn assessor(mut self, assessor: Arc<dyn RiskAssessor>) -> Self {
        self.assessor = Some(assessor);
        self
    }

    pub fn without_assessor(mut self) -> Self {
        self.assessor = None;
        self
    }

    pub fn vault(mut self, vault: ScriptedVault) -> Self {
        self.vault = vault;
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn hedge(mut self, hedge: HedgeSettings) -> Self {
        self.hedge = hedge;
        self
    }

    pub fn without_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    /// Register a sink that rejects every record ahead of the others.
    pub fn with_failing_sink(mut self) -> Self {
        self.failing_sink = true;
        self
    }

    pub fn build(self) -> Harness {
        let db = TempDb::create();
        let recorder = RecordingAuditSink::new();
        let mut audit = AuditSinkSet::new();
        if self.failing_sink {
            audit.register(Box::new(FailingAuditSink));
        }
        audit.register(Box::new(recorder.clone()));
        audit.register(Box::new(db.store().clone()));
        let audit = Arc::new(audit);

        let vault = Arc::new(self.vault);
        let fixed = Arc::new(ScriptedRateSource::fixed("boros", "ETH", self.fixed));
        let floating = Arc::new(ScriptedRateSource::floating(
            "hyperliquid",
            "ETH",
            self.floating,
        ));

        let orchestrator = Arc::new(HedgeOrchestrator::new(
            vault.clone(),
            StrategyKind::DirectOrder.build(vault.clone()),
            self.fallback.map(|kind| kind.build(vault.clone())),
            audit.clone(),
            self.hedge,
        ));
        let engine = DecisionEngine::new(
            self.settings,
            vec![fixed.clone(), floating.clone()],
            self.assessor,
            orchestrator,
            audit,
        );

        Harness {
            engine,
            fixed,
            floating,
            vault,
            recorder,
            db,
        }
    }
}
