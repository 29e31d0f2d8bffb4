//! 分类流水线 - 编排层
//!
//! ## 职责
//!
//! 把"加载 → 分类 → 输出"三个阶段串起来，是整个系统的"指挥中心"。
//!
//! ## 阶段
//!
//! 1. **加载**：对计划需要的每种模型派发一个加载任务，全部汇合后冻结模型表
//! 2. **分类**：对 (集合 × 模型) 的每个组合派发一个分类任务，全部汇合后写回记录
//! 3. **完成**：只有此时才能读取记录、生成输出
//!
//! 阶段用类型表示（`Pipeline<Loading>` → `Pipeline<Classifying>` → `Pipeline<Done>`），
//! 在分类汇合前读取记录在编译期就不可能发生。任一阶段失败返回错误，不会进入下一阶段。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::ModelLoader;
use crate::models::{Collections, JobPlan};
use crate::orchestrator::phase::Phase;
use crate::orchestrator::task_group::TaskGroup;
use crate::services::{LoadedModels, ModelCache};
use crate::utils::logging;
use crate::workflow::{ClassificationJob, JobCtx, JobOutput};

/// 调度参数
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// 同一阶段同时运行的任务数
    pub max_concurrent: usize,
    /// 单个任务的超时
    pub timeout: Option<Duration>,
}

impl Limits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent: config.max_concurrent_jobs,
            timeout: config.job_timeout(),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 加载阶段
pub struct Loading {
    cache: Arc<ModelCache>,
}

/// 分类阶段
pub struct Classifying {
    models: LoadedModels,
}

/// 完成
pub struct Done;

/// 阶段标记
pub trait PipelineState {
    const PHASE: Phase;
}

impl PipelineState for Loading {
    const PHASE: Phase = Phase::Loading;
}

impl PipelineState for Classifying {
    const PHASE: Phase = Phase::Classifying;
}

impl PipelineState for Done {
    const PHASE: Phase = Phase::Done;
}

/// 分类流水线
pub struct Pipeline<S: PipelineState> {
    collections: Collections,
    plan: JobPlan,
    limits: Limits,
    state: S,
}

impl<S: PipelineState> Pipeline<S> {
    /// 当前阶段
    pub fn phase(&self) -> Phase {
        S::PHASE
    }
}

impl Pipeline<Loading> {
    /// 创建流水线
    ///
    /// 计划中的每个集合都必须存在于 `collections` 中。
    pub fn new(
        loader: Arc<dyn ModelLoader>,
        collections: Collections,
        plan: JobPlan,
        limits: Limits,
    ) -> AppResult<Self> {
        for entry in plan.collections() {
            if collections.get(&entry.name).is_none() {
                return Err(AppError::input(&entry.name, "任务计划引用了不存在的集合"));
            }
        }

        Ok(Self {
            collections,
            plan,
            limits,
            state: Loading {
                cache: Arc::new(ModelCache::new(loader)),
            },
        })
    }

    /// 并发加载全部所需模型，全部完成后进入分类阶段
    pub async fn load_models(self) -> AppResult<Pipeline<Classifying>> {
        let kinds = self.plan.required_kinds();
        logging::log_phase_start(Phase::Loading, kinds.len());

        let mut group = TaskGroup::new(Phase::Loading, self.limits.max_concurrent, self.limits.timeout);
        for &kind in &kinds {
            let cache = self.state.cache.clone();
            let options = self.plan.options_for(kind);
            group.spawn(format!("加载 {}", kind), async move {
                cache.get_or_load(kind, options).await.map(|_| ())
            });
        }
        group.join_all().await?;

        let models = self.state.cache.freeze(&kinds)?;

        Ok(Pipeline {
            collections: self.collections,
            plan: self.plan,
            limits: self.limits,
            state: Classifying { models },
        })
    }
}

impl Pipeline<Classifying> {
    /// 并发运行全部分类任务，全部完成后写回记录
    pub async fn classify(mut self) -> AppResult<Pipeline<Done>> {
        let jobs = self.plan.jobs();
        logging::log_phase_start(Phase::Classifying, jobs.len());

        let mut texts = HashMap::new();
        let mut group: TaskGroup<JobOutput> =
            TaskGroup::new(Phase::Classifying, self.limits.max_concurrent, self.limits.timeout);

        for (i, spec) in jobs.iter().enumerate() {
            let ctx = JobCtx::from_spec(spec, i + 1);

            let model = self.state.models.get(spec.kind).ok_or_else(|| {
                AppError::model_load(spec.kind, anyhow::anyhow!("模型未在加载阶段就绪"))
            })?;

            let snapshot = match texts.get(&spec.collection) {
                Some(snapshot) => Arc::clone(snapshot),
                None => {
                    let collection = self.collections.get(&spec.collection).ok_or_else(|| {
                        AppError::input(&spec.collection, "任务计划引用了不存在的集合")
                    })?;
                    let snapshot = collection.texts();
                    texts.insert(spec.collection.clone(), Arc::clone(&snapshot));
                    snapshot
                }
            };

            let label = ctx.to_string();
            group.spawn(label, ClassificationJob::new(ctx, snapshot, model).run_blocking());
        }

        let outputs = group.join_all().await?;

        for output in outputs {
            let collection = self.collections.get_mut(&output.collection).ok_or_else(|| {
                AppError::input(&output.collection, "任务计划引用了不存在的集合")
            })?;
            output.apply(collection)?;
        }

        info!("✓ 全部 {} 个分类任务已写回", jobs.len());

        Ok(Pipeline {
            collections: self.collections,
            plan: self.plan,
            limits: self.limits,
            state: Done,
        })
    }
}

impl Pipeline<Done> {
    /// 分类完成的集合
    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn into_collections(self) -> Collections {
        self.collections
    }
}

/// 运行完整流水线：加载 → 分类 → 返回分类完成的集合
pub async fn run(
    loader: Arc<dyn ModelLoader>,
    collections: Collections,
    plan: JobPlan,
    limits: Limits,
) -> AppResult<Collections> {
    let pipeline = Pipeline::new(loader, collections, plan, limits)?;
    let done = pipeline.load_models().await?.classify().await?;
    Ok(done.into_collections())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{Prediction, TextClassifier};
    use crate::models::{Collection, CollectionPlan, LoadOptions, ModelKind, Slot};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct KindLabel(ModelKind);

    impl TextClassifier for KindLabel {
        fn predict(&self, text: &str) -> anyhow::Result<Prediction> {
            Ok(Prediction::new(format!("{}:{}", self.0, text)))
        }
    }

    #[derive(Default)]
    struct CountingLoader {
        calls: AtomicUsize,
        fail: Option<ModelKind>,
    }

    impl ModelLoader for CountingLoader {
        fn load(
            &self,
            kind: ModelKind,
            _options: &LoadOptions,
        ) -> anyhow::Result<Arc<dyn TextClassifier>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail == Some(kind) {
                anyhow::bail!("missing weights");
            }
            Ok(Arc::new(KindLabel(kind)))
        }
    }

    fn collections() -> Collections {
        Collections::new(vec![
            Collection::new("articles", vec!["a".to_string()]),
            Collection::new("tweets", vec!["b".to_string(), "c".to_string()]),
        ])
    }

    #[tokio::test]
    async fn test_phases_advance_in_order() {
        let loader = Arc::new(CountingLoader::default());
        let plan = JobPlan::symmetric(["articles", "tweets"]);

        let pipeline = Pipeline::new(loader.clone(), collections(), plan, Limits::default()).unwrap();
        assert_eq!(pipeline.phase(), Phase::Loading);

        let pipeline = pipeline.load_models().await.unwrap();
        assert_eq!(pipeline.phase(), Phase::Classifying);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 3);

        let done = pipeline.classify().await.unwrap();
        assert_eq!(done.phase(), Phase::Done);

        let tweets = done.collections().get("tweets").unwrap();
        assert_eq!(tweets.records[1].label(Slot::Hate), Some("hate:c"));
        assert_eq!(
            tweets.records[0].label(Slot::Topic),
            Some("topic_classification:b")
        );
    }

    #[tokio::test]
    async fn test_asymmetric_plan_leaves_unassigned_slots_empty() {
        let plan = JobPlan::new(
            vec![
                CollectionPlan {
                    name: "articles".to_string(),
                    output_name: "articles".to_string(),
                    kinds: vec![ModelKind::TopicClassification],
                },
                CollectionPlan {
                    name: "tweets".to_string(),
                    output_name: "tweets".to_string(),
                    kinds: vec![ModelKind::Sentiment],
                },
            ],
            HashMap::new(),
        )
        .unwrap();
        let loader = Arc::new(CountingLoader::default());

        let result = run(loader.clone(), collections(), plan, Limits::default())
            .await
            .unwrap();

        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
        let articles = result.get("articles").unwrap();
        assert!(articles.records[0].topic().is_some());
        assert!(articles.records[0].sentiment().is_none());
        let tweets = result.get("tweets").unwrap();
        assert!(tweets.records.iter().all(|r| r.sentiment().is_some() && r.topic().is_none()));
    }

    #[tokio::test]
    async fn test_load_failure_stops_before_classify() {
        let loader = Arc::new(CountingLoader {
            fail: Some(ModelKind::Hate),
            ..CountingLoader::default()
        });
        let plan = JobPlan::symmetric(["articles", "tweets"]);
        let pipeline = Pipeline::new(loader, collections(), plan, Limits::default()).unwrap();

        match pipeline.load_models().await {
            Err(AppError::ModelLoad { kind, .. }) => assert_eq!(kind, ModelKind::Hate),
            Err(other) => panic!("应为模型加载错误: {}", other),
            Ok(_) => panic!("加载失败时不应进入分类阶段"),
        }
    }

    #[tokio::test]
    async fn test_plan_referencing_missing_collection_is_rejected() {
        let plan = JobPlan::symmetric(["articles", "missing"]);
        let result = Pipeline::new(
            Arc::new(CountingLoader::default()),
            collections(),
            plan,
            Limits::default(),
        );
        assert!(matches!(result, Err(AppError::Input { .. })));
    }

    /// 每条预测 100ms，记录调用次数
    struct SlowLoader {
        calls: Arc<AtomicUsize>,
    }

    struct SlowModel {
        calls: Arc<AtomicUsize>,
    }

    impl TextClassifier for SlowModel {
        fn predict(&self, _text: &str) -> anyhow::Result<Prediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(100));
            Ok(Prediction::new("slow"))
        }
    }

    impl ModelLoader for SlowLoader {
        fn load(
            &self,
            _kind: ModelKind,
            _options: &LoadOptions,
        ) -> anyhow::Result<Arc<dyn TextClassifier>> {
            Ok(Arc::new(SlowModel {
                calls: self.calls.clone(),
            }))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_job_timeout_stops_remaining_predictions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let texts: Vec<String> = (0..8).map(|i| format!("t{}", i)).collect();
        let collections = Collections::new(vec![Collection::new("tweets", texts)]);
        let plan = JobPlan::new(
            vec![CollectionPlan {
                name: "tweets".to_string(),
                output_name: "tweets".to_string(),
                kinds: vec![ModelKind::Sentiment],
            }],
            HashMap::new(),
        )
        .unwrap();
        let limits = Limits {
            max_concurrent: 4,
            timeout: Some(Duration::from_millis(150)),
        };

        let result = run(
            Arc::new(SlowLoader {
                calls: calls.clone(),
            }),
            collections,
            plan,
            limits,
        )
        .await;
        assert!(matches!(result, Err(AppError::Timeout { .. })));

        tokio::time::sleep(Duration::from_millis(400)).await;
        let settled = calls.load(Ordering::SeqCst);
        assert!(settled < 8, "超时后仍预测了全部记录");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(calls.load(Ordering::SeqCst), settled);
    }
}
