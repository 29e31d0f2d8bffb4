//! 模型缓存 - 业务能力层
//!
//! 按模型类型缓存已加载的模型，保证每种类型只加载一次：
//! 同一类型的并发请求共享同一次加载，不同类型的加载互不阻塞。
//!
//! 实现上每个类型对应一个 `OnceCell`。映射表的锁只在"认领单元格"时持有，
//! 真正的加载在锁外、在阻塞线程池中执行。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::infrastructure::{ModelLoader, TextClassifier};
use crate::models::{LoadOptions, ModelKind};

type ModelSlot = Arc<OnceCell<Arc<dyn TextClassifier>>>;

/// 模型缓存
pub struct ModelCache {
    loader: Arc<dyn ModelLoader>,
    entries: Mutex<HashMap<ModelKind, ModelSlot>>,
}

impl ModelCache {
    /// 创建空缓存
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// 获取模型，未加载时加载
    ///
    /// 同一类型只有一次加载会执行到底并写入缓存；加载期间到达的请求等待该次加载的结果。
    /// 加载失败不会写入缓存。
    ///
    /// 初始化在独立任务中进行：调用方被丢弃（例如超时）时，进行中的加载仍会完成并写入缓存，
    /// 之后的请求直接复用结果而不会再次加载。
    pub async fn get_or_load(
        &self,
        kind: ModelKind,
        options: LoadOptions,
    ) -> AppResult<Arc<dyn TextClassifier>> {
        let cell = self.claim(kind);

        if let Some(model) = cell.get() {
            debug!("模型缓存命中: {}", kind);
            return Ok(model.clone());
        }

        let loader = self.loader.clone();
        let init = tokio::spawn(async move {
            cell.get_or_try_init(|| load(loader, kind, options))
                .await
                .cloned()
        });

        init.await.map_err(|e| AppError::TaskPanicked {
            task: format!("加载 {}", kind),
            reason: e.to_string(),
        })?
    }

    /// 已加载的模型（不触发加载）
    pub fn get(&self, kind: ModelKind) -> Option<Arc<dyn TextClassifier>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(&kind).and_then(|cell| cell.get().cloned())
    }

    /// 冻结缓存，得到分类阶段使用的只读模型表
    ///
    /// `kinds` 中任一类型未加载时返回模型加载错误。
    pub fn freeze(&self, kinds: &[ModelKind]) -> AppResult<LoadedModels> {
        let mut models = HashMap::with_capacity(kinds.len());
        for &kind in kinds {
            let model = self.get(kind).ok_or_else(|| {
                AppError::model_load(kind, anyhow::anyhow!("加载阶段结束后模型仍未就绪"))
            })?;
            models.insert(kind, model);
        }
        Ok(LoadedModels { models })
    }

    /// 取出（或创建）某类型的单元格
    fn claim(&self, kind: ModelKind) -> ModelSlot {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.entry(kind).or_default().clone()
    }
}

/// 在阻塞线程池中执行一次加载
async fn load(
    loader: Arc<dyn ModelLoader>,
    kind: ModelKind,
    options: LoadOptions,
) -> AppResult<Arc<dyn TextClassifier>> {
    info!("⏳ 开始加载模型: {}", kind);
    let started = Instant::now();

    let model = tokio::task::spawn_blocking(move || loader.load(kind, &options))
        .await
        .map_err(|e| AppError::TaskPanicked {
            task: format!("加载 {}", kind),
            reason: e.to_string(),
        })?
        .map_err(|e| AppError::model_load(kind, e))?;

    info!(
        "✓ 模型 {} 加载完成，耗时 {:.1}s",
        kind,
        started.elapsed().as_secs_f64()
    );
    Ok(model)
}

/// 分类阶段的只读模型表
#[derive(Clone)]
pub struct LoadedModels {
    models: HashMap<ModelKind, Arc<dyn TextClassifier>>,
}

impl LoadedModels {
    pub fn get(&self, kind: ModelKind) -> Option<Arc<dyn TextClassifier>> {
        self.models.get(&kind).cloned()
    }
}

impl std::fmt::Debug for LoadedModels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.models.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::Prediction;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::time::Duration;

    struct FixedModel(&'static str);

    impl TextClassifier for FixedModel {
        fn predict(&self, _text: &str) -> anyhow::Result<Prediction> {
            Ok(Prediction::new(self.0))
        }
    }

    /// 慢速加载器，记录加载次数
    #[derive(Default)]
    struct SlowLoader {
        calls: AtomicUsize,
    }

    impl ModelLoader for SlowLoader {
        fn load(
            &self,
            _kind: ModelKind,
            _options: &LoadOptions,
        ) -> anyhow::Result<Arc<dyn TextClassifier>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(100));
            Ok(Arc::new(FixedModel("T")))
        }
    }

    struct FailingLoader;

    impl ModelLoader for FailingLoader {
        fn load(
            &self,
            kind: ModelKind,
            _options: &LoadOptions,
        ) -> anyhow::Result<Arc<dyn TextClassifier>> {
            anyhow::bail!("{} 权重文件缺失", kind)
        }
    }

    /// 三个类型必须同时处于加载中才能通过屏障
    struct RendezvousLoader {
        barrier: Barrier,
    }

    impl ModelLoader for RendezvousLoader {
        fn load(
            &self,
            _kind: ModelKind,
            _options: &LoadOptions,
        ) -> anyhow::Result<Arc<dyn TextClassifier>> {
            self.barrier.wait();
            Ok(Arc::new(FixedModel("R")))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_share_one_load() {
        let loader = Arc::new(SlowLoader::default());
        let cache = Arc::new(ModelCache::new(loader.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_load(ModelKind::Sentiment, LoadOptions::default())
                        .await
                })
            })
            .collect();

        let mut models = Vec::new();
        for handle in handles {
            models.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert!(models.iter().all(|m| Arc::ptr_eq(m, &models[0])));
    }

    #[tokio::test]
    async fn test_second_request_hits_cache() {
        let loader = Arc::new(SlowLoader::default());
        let cache = ModelCache::new(loader.clone());

        let first = cache
            .get_or_load(ModelKind::Hate, LoadOptions::default())
            .await
            .unwrap();
        let second = cache
            .get_or_load(ModelKind::Hate, LoadOptions::default())
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_different_kinds_load_concurrently() {
        let cache = Arc::new(ModelCache::new(Arc::new(RendezvousLoader {
            barrier: Barrier::new(ModelKind::ALL.len()),
        })));

        let handles: Vec<_> = ModelKind::ALL
            .iter()
            .map(|&kind| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_or_load(kind, LoadOptions::default()).await })
            })
            .collect();

        let joined = tokio::time::timeout(
            Duration::from_secs(5),
            futures::future::join_all(handles),
        )
        .await
        .expect("不同类型的加载应当并发进行");

        for result in joined {
            assert!(result.unwrap().is_ok());
        }
    }

    #[tokio::test]
    async fn test_load_failure_is_reported_and_not_cached() {
        let cache = ModelCache::new(Arc::new(FailingLoader));

        let result = cache
            .get_or_load(ModelKind::TopicClassification, LoadOptions::default())
            .await;

        match result {
            Err(AppError::ModelLoad { kind, .. }) => {
                assert_eq!(kind, ModelKind::TopicClassification)
            }
            other => panic!("应为模型加载错误: {:?}", other.map(|_| ())),
        }
        assert!(cache.get(ModelKind::TopicClassification).is_none());
    }

    #[tokio::test]
    async fn test_freeze_requires_every_kind() {
        let cache = ModelCache::new(Arc::new(SlowLoader::default()));
        cache
            .get_or_load(ModelKind::Sentiment, LoadOptions::default())
            .await
            .unwrap();

        let frozen = cache.freeze(&[ModelKind::Sentiment]).unwrap();
        assert!(frozen.get(ModelKind::Sentiment).is_some());
        assert!(frozen.get(ModelKind::Hate).is_none());

        let missing = cache.freeze(&[ModelKind::Sentiment, ModelKind::Hate]);
        assert!(matches!(
            missing,
            Err(AppError::ModelLoad {
                kind: ModelKind::Hate,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_abandoned_request_does_not_cause_second_load() {
        let loader = Arc::new(SlowLoader::default());
        let cache = ModelCache::new(loader.clone());

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            cache.get_or_load(ModelKind::Sentiment, LoadOptions::default()),
        )
        .await;
        assert!(abandoned.is_err());

        let model = cache
            .get_or_load(ModelKind::Sentiment, LoadOptions::default())
            .await;
        assert!(model.is_ok());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }
}
