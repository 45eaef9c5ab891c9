use std::{path::PathBuf, sync::Arc};

use crate::{
    config::Settings,
    delivery::Delivery,
    dispatcher::ParallelDispatcher,
    llm::{prompt::SummaryTemplate, summarizer::VideoSummarizer, ChatCompletion},
    report::{markup::MarkupStyle, titles::TitleTranslator, ReportBuilder, ReportRenderer},
    resolver::{ContentResolver, ResolverPolicy},
    yt::{FetchWindow, MetadataSource, TranscriptSource, VideoSource},
    DigestProcessor,
};

#[derive(Debug, Clone)]
struct ProcessorOptions {
    window: FetchWindow,
    max_workers: usize,
    template: SummaryTemplate,
    summary_language: String,
    resolver_policy: ResolverPolicy,
    markup: MarkupStyle,
    translator: TitleTranslator,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            window: FetchWindow::default(),
            max_workers: 5,
            template: SummaryTemplate::default(),
            summary_language: "English".into(),
            resolver_policy: ResolverPolicy::default(),
            markup: MarkupStyle::default(),
            translator: TitleTranslator::default(),
        }
    }
}

pub struct DigestProcessorBuilder<V = (), T = (), M = (), C = (), R = (), D = ()> {
    output_dir: PathBuf,
    recipient: String,
    video_source: V,
    transcripts: T,
    metadata: M,
    chat: C,
    renderer: R,
    delivery: D,
    options: ProcessorOptions,
}

impl DigestProcessorBuilder {
    pub fn new(output_dir: impl Into<PathBuf>, recipient: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            recipient: recipient.into(),
            video_source: (),
            transcripts: (),
            metadata: (),
            chat: (),
            renderer: (),
            delivery: (),
            options: ProcessorOptions::default(),
        }
    }
}

impl<V, T, M, C, R, D> DigestProcessorBuilder<V, T, M, C, R, D> {
    pub fn video_source<V2: VideoSource + Send + Sync + 'static>(
        self,
        video_source: V2,
    ) -> DigestProcessorBuilder<V2, T, M, C, R, D> {
        DigestProcessorBuilder {
            output_dir: self.output_dir,
            recipient: self.recipient,
            video_source,
            transcripts: self.transcripts,
            metadata: self.metadata,
            chat: self.chat,
            renderer: self.renderer,
            delivery: self.delivery,
            options: self.options,
        }
    }

    pub fn transcripts<T2: TranscriptSource + Send + Sync + 'static>(
        self,
        transcripts: T2,
    ) -> DigestProcessorBuilder<V, T2, M, C, R, D> {
        DigestProcessorBuilder {
            output_dir: self.output_dir,
            recipient: self.recipient,
            video_source: self.video_source,
            transcripts,
            metadata: self.metadata,
            chat: self.chat,
            renderer: self.renderer,
            delivery: self.delivery,
            options: self.options,
        }
    }

    pub fn metadata<M2: MetadataSource + Send + Sync + 'static>(
        self,
        metadata: M2,
    ) -> DigestProcessorBuilder<V, T, M2, C, R, D> {
        DigestProcessorBuilder {
            output_dir: self.output_dir,
            recipient: self.recipient,
            video_source: self.video_source,
            transcripts: self.transcripts,
            metadata,
            chat: self.chat,
            renderer: self.renderer,
            delivery: self.delivery,
            options: self.options,
        }
    }

    pub fn chat<C2: ChatCompletion + Send + Sync + 'static>(
        self,
        chat: C2,
    ) -> DigestProcessorBuilder<V, T, M, C2, R, D> {
        DigestProcessorBuilder {
            output_dir: self.output_dir,
            recipient: self.recipient,
            video_source: self.video_source,
            transcripts: self.transcripts,
            metadata: self.metadata,
            chat,
            renderer: self.renderer,
            delivery: self.delivery,
            options: self.options,
        }
    }

    pub fn renderer<R2: ReportRenderer + Send + Sync + 'static>(
        self,
        renderer: R2,
    ) -> DigestProcessorBuilder<V, T, M, C, R2, D> {
        DigestProcessorBuilder {
            output_dir: self.output_dir,
            recipient: self.recipient,
            video_source: self.video_source,
            transcripts: self.transcripts,
            metadata: self.metadata,
            chat: self.chat,
            renderer,
            delivery: self.delivery,
            options: self.options,
        }
    }

    pub fn delivery<D2: Delivery + Send + Sync + 'static>(
        self,
        delivery: D2,
    ) -> DigestProcessorBuilder<V, T, M, C, R, D2> {
        DigestProcessorBuilder {
            output_dir: self.output_dir,
            recipient: self.recipient,
            video_source: self.video_source,
            transcripts: self.transcripts,
            metadata: self.metadata,
            chat: self.chat,
            renderer: self.renderer,
            delivery,
            options: self.options,
        }
    }

    pub fn window(mut self, window: FetchWindow) -> Self {
        self.options.window = window;
        self
    }

    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.options.max_workers = max_workers;
        self
    }

    pub fn template(mut self, template: SummaryTemplate) -> Self {
        self.options.template = template;
        self
    }

    pub fn summary_language(mut self, language: impl Into<String>) -> Self {
        self.options.summary_language = language.into();
        self
    }

    pub fn resolver_policy(mut self, policy: ResolverPolicy) -> Self {
        self.options.resolver_policy = policy;
        self
    }

    pub fn markup(mut self, markup: MarkupStyle) -> Self {
        self.options.markup = markup;
        self
    }

    pub fn title_translator(mut self, translator: TitleTranslator) -> Self {
        self.options.translator = translator;
        self
    }

    /// Applies every tunable from the settings file
    pub fn with_settings(self, settings: &Settings) -> Self {
        self.window(FetchWindow {
            max_channels: settings.max_channels_to_process,
            max_videos_per_channel: settings.max_videos_per_channel,
            days_back: settings.days_back_to_fetch,
        })
        .max_workers(settings.max_workers)
        .template(settings.summary_template)
        .summary_language(settings.summary_language.clone())
        .resolver_policy(ResolverPolicy {
            languages: settings.transcript_languages.clone(),
            min_transcript_chars: settings.min_transcript_chars,
            min_description_chars: settings.min_description_chars,
        })
        .markup(settings.markup)
        .title_translator(TitleTranslator::new(settings.title_translations.clone()))
    }
}

impl<V, T, M, C, R, D> DigestProcessorBuilder<V, T, M, C, R, D>
where
    V: VideoSource + Send + Sync + 'static,
    T: TranscriptSource + Send + Sync + 'static,
    M: MetadataSource + Send + Sync + 'static,
    C: ChatCompletion + Send + Sync + 'static,
    R: ReportRenderer + Send + Sync + 'static,
    D: Delivery + Send + Sync + 'static,
{
    pub fn build(self) -> DigestProcessor<V, T, M, C, R, D> {
        let ProcessorOptions {
            window,
            max_workers,
            template,
            summary_language,
            resolver_policy,
            markup,
            translator,
        } = self.options;

        let resolver = ContentResolver::new(self.transcripts, self.metadata, resolver_policy);
        let summarizer = VideoSummarizer::new(resolver, self.chat, template, summary_language);

        DigestProcessor {
            video_source: self.video_source,
            summarizer: Arc::new(summarizer),
            renderer: self.renderer,
            delivery: self.delivery,
            dispatcher: ParallelDispatcher::new(max_workers),
            report_builder: ReportBuilder::new(markup, translator),
            window,
            output_dir: self.output_dir,
            recipient: self.recipient,
        }
    }
}
