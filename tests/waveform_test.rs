use tempfile::TempDir;
use wavedeck::waveform::generator::{read_amplitudes, render_amplitudes};
use wavedeck::waveform::{WaveformColors, WaveformSpec};

fn write_mono_wav(path: &std::path::Path, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_silent_file_draws_flat_line() {
    let temp_dir = TempDir::new().unwrap();
    let wav = temp_dir.path().join("silence.wav");
    write_mono_wav(&wav, &[0; 2000]);

    let amplitudes = read_amplitudes(&wav).unwrap();
    let spec = WaveformSpec::new(&wav, 100, 30);
    let image = render_amplitudes(&amplitudes, &spec).unwrap();
    let colors = WaveformColors::default();

    assert_eq!((image.width(), image.height()), (100, 30));
    for (_, y, pixel) in image.enumerate_pixels() {
        if y == 15 {
            assert_eq!(*pixel, colors.center_line);
        } else {
            assert_eq!(*pixel, colors.background);
        }
    }
}

#[test]
fn test_short_file_narrows_image() {
    let temp_dir = TempDir::new().unwrap();
    let wav = temp_dir.path().join("blip.wav");
    write_mono_wav(&wav, &[1000, -2000, 500, 0, 1500]);

    let amplitudes = read_amplitudes(&wav).unwrap();
    let image = render_amplitudes(&amplitudes, &WaveformSpec::new(&wav, 640, 48)).unwrap();
    assert_eq!(image.width(), 5);
    assert_eq!(image.height(), 48);
}

#[test]
fn test_column_heights_follow_loudness() {
    let temp_dir = TempDir::new().unwrap();
    let wav = temp_dir.path().join("ramp.wav");
    // Four columns of 100 frames each, getting louder
    let levels = [500i16, 1000, 2000, 4000];
    let samples: Vec<i16> = (0..400).map(|i| levels[i / 100]).collect();
    write_mono_wav(&wav, &samples);

    let amplitudes = read_amplitudes(&wav).unwrap();
    let spec = WaveformSpec::new(&wav, 4, 200);
    let image = render_amplitudes(&amplitudes, &spec).unwrap();
    let colors = WaveformColors::default();

    let bar_top = |x: u32| (0..100).find(|&y| *image.get_pixel(x, y) == colors.top_wave);
    assert_eq!(bar_top(0), Some(75));
    assert_eq!(bar_top(1), Some(50));
    assert_eq!(bar_top(2), Some(0));
    // The peak column overshoots half the height and is averaged from its
    // neighbours, the missing right one counting as zero
    assert_eq!(bar_top(3), Some(50));
}
