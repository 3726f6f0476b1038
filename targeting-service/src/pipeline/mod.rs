use std::{pin::Pin, sync::Arc};

use amr_client::RecordError;
use futures::{Stream, StreamExt};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    /// 1-based position of the record in its source.
    pub position: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("sink error: {0}")]
    Sink(String),
    #[error(transparent)]
    Record(#[from] RecordError),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run<S>(&self, input: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

pub struct Pipeline<S, T, K> {
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform<T, T> + Send + Sync>>, // same-type transforms chain
    pub sink: K,
}

impl<T, S, K> Pipeline<S, T, K>
where
    T: Send + 'static,
    S: Source<T> + Send + Sync + 'static,
    K: Sink<T> + Send + Sync + 'static,
{
    pub async fn run(self) -> Result<(), PipelineError> {
        let mut stream = self.source.stream().await;

        // Apply transforms in sequence (if any).
        for t in self.transforms {
            stream = Box::pin(stream.then(move |item| {
                let t_inner = t.clone();
                async move {
                    match item {
                        Ok(env) => t_inner.apply(env).await,
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        self.sink.run(stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecSource(Vec<u32>);

    #[async_trait::async_trait]
    impl Source<u32> for VecSource {
        async fn stream(&self) -> EnvelopeStream<u32> {
            let items: Vec<_> = self
                .0
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    Ok(Envelope {
                        payload: *v,
                        position: i as u64 + 1,
                    })
                })
                .collect();
            Box::pin(futures::stream::iter(items))
        }
    }

    struct Double;

    #[async_trait::async_trait]
    impl Transform<u32, u32> for Double {
        async fn apply(&self, input: Envelope<u32>) -> Result<Envelope<u32>, PipelineError> {
            Ok(Envelope {
                payload: input.payload * 2,
                position: input.position,
            })
        }
    }

    struct RejectOdd;

    #[async_trait::async_trait]
    impl Transform<u32, u32> for RejectOdd {
        async fn apply(&self, input: Envelope<u32>) -> Result<Envelope<u32>, PipelineError> {
            if input.payload % 2 == 1 {
                return Err(RecordError::InvalidField {
                    record: format!("row {}", input.position),
                    field: "VALUE",
                    value: input.payload.to_string(),
                }
                .into());
            }
            Ok(input)
        }
    }

    #[derive(Default)]
    struct SumSink(std::sync::Mutex<u32>);

    #[async_trait::async_trait]
    impl Sink<u32> for SumSink {
        async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
        where
            S: Stream<Item = Result<Envelope<u32>, PipelineError>> + Send + Unpin + 'static,
        {
            while let Some(item) = input.next().await {
                let value = item?.payload;
                *self.0.lock().unwrap() += value;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn transforms_apply_in_order() {
        let sink = Arc::new(SumSink::default());
        let pipeline: Pipeline<_, u32, _> = Pipeline {
            source: VecSource(vec![1, 2, 3]),
            transforms: vec![Arc::new(Double), Arc::new(RejectOdd)],
            sink: SharedSink(sink.clone()),
        };

        pipeline.run().await.unwrap();
        assert_eq!(*sink.0.lock().unwrap(), 12);
    }

    #[tokio::test]
    async fn transform_error_reaches_sink() {
        let pipeline: Pipeline<_, u32, _> = Pipeline {
            source: VecSource(vec![2, 3]),
            transforms: vec![Arc::new(RejectOdd)],
            sink: SumSink::default(),
        };

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Record(RecordError::InvalidField { record, .. }) if record == "row 2"
        ));
    }

    struct SharedSink(Arc<SumSink>);

    #[async_trait::async_trait]
    impl Sink<u32> for SharedSink {
        async fn run<S>(&self, input: S) -> Result<(), PipelineError>
        where
            S: Stream<Item = Result<Envelope<u32>, PipelineError>> + Send + Unpin + 'static,
        {
            self.0.run(input).await
        }
    }
}
