use crate::dom::js_err;
use crate::field::constants::ANALYSER_FFT_SIZE;
use crate::field::{AnalyserBeatSource, BeatSource};
use web_sys as web;

pub fn create_analyser(audio_ctx: &web::AudioContext) -> anyhow::Result<web::AnalyserNode> {
    let analyser = web::AnalyserNode::new(audio_ctx).map_err(js_err)?;
    analyser.set_fft_size(ANALYSER_FFT_SIZE);
    Ok(analyser)
}

/// Beat source fed from a media element through an analyser node.
///
/// The element is rerouted `element -> analyser -> destination`, so it keeps
/// playing through the speakers while the spectrum is sampled every frame.
pub struct AnalyserTap {
    _audio_ctx: web::AudioContext,
    analyser: web::AnalyserNode,
    bins: Vec<u8>,
    envelope: AnalyserBeatSource,
}

impl AnalyserTap {
    pub fn connect(element: &web::HtmlMediaElement) -> anyhow::Result<Self> {
        let audio_ctx = web::AudioContext::new().map_err(js_err)?;
        let analyser = create_analyser(&audio_ctx)?;
        let source = audio_ctx
            .create_media_element_source(element)
            .map_err(js_err)?;
        source
            .connect_with_audio_node(&analyser)
            .map_err(js_err)?;
        analyser
            .connect_with_audio_node(&audio_ctx.destination())
            .map_err(js_err)?;
        let bins = vec![0u8; analyser.frequency_bin_count() as usize];
        log::info!("[audio] analyser connected ({} bins)", bins.len());
        Ok(Self {
            _audio_ctx: audio_ctx,
            analyser,
            bins,
            envelope: AnalyserBeatSource::new(),
        })
    }
}

impl BeatSource for AnalyserTap {
    fn advance(&mut self, now_ms: f64, playing: bool) {
        if playing {
            self.analyser.get_byte_frequency_data(&mut self.bins);
            self.envelope.feed(&self.bins);
        } else {
            self.envelope.feed(&[]);
        }
        self.envelope.advance(now_ms, playing);
    }

    fn current_envelope(&self) -> f32 {
        self.envelope.current_envelope()
    }
}
