//! `Sound` and voice handles over the console's sample mixer.

use std::sync::Arc;

use mlua::{Lua, MetaMethod, UserData, UserDataMethods};

use luaplayer_core::audio::{MAX_MASTER_VOLUME, MAX_VOICE_FREQUENCY, SampleMixer, Sound, VoiceId};

use super::hardware;

fn mixer(lua: &Lua) -> mlua::Result<Arc<SampleMixer>> {
    Ok(Arc::clone(hardware(lua)?.console().mixer()))
}

struct SoundHandle(Sound);

struct Voice(VoiceId);

impl UserData for SoundHandle {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("play", |lua, this, looping: Option<bool>| {
            let id = mixer(lua)?.play(&this.0, looping.unwrap_or(false));
            Ok(Voice(id))
        });

        methods.add_method("length", |_, this, ()| Ok(this.0.len()));
        methods.add_method("sampleRate", |_, this, ()| Ok(this.0.sample_rate()));
    }
}

impl UserData for Voice {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("stop", |lua, this, ()| {
            mixer(lua)?.stop_voice(this.0);
            Ok(())
        });

        methods.add_method("playing", |lua, this, ()| Ok(mixer(lua)?.is_playing(this.0)));

        methods.add_method("volume", |lua, this, volume: f64| {
            mixer(lua)?.set_volume(this.0, volume.clamp(0.0, 255.0) as u8);
            Ok(())
        });

        // Playback rate in Hz; the sound's own rate plays it unchanged.
        methods.add_method("frequency", |lua, this, hz: f64| {
            mixer(lua)?.set_frequency(this.0, hz.clamp(1.0, f64::from(MAX_VOICE_FREQUENCY)) as u32);
            Ok(())
        });

        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(format!("{:?}", this.0)));
    }
}

pub(super) fn install(lua: &Lua) -> mlua::Result<()> {
    let table = lua.create_table()?;

    table.set(
        "load",
        lua.create_function(|_, path: String| {
            Sound::load_wav(&path)
                .map(SoundHandle)
                .map_err(|err| mlua::Error::runtime(format!("Sound.load({path}): {err}")))
        })?,
    )?;

    table.set(
        "stopAll",
        lua.create_function(|lua, ()| {
            mixer(lua)?.stop_all();
            Ok(())
        })?,
    )?;

    // Sound.volume([v]) sets the master volume when given one and returns it.
    table.set(
        "volume",
        lua.create_function(|lua, volume: Option<f64>| {
            let mixer = mixer(lua)?;
            if let Some(volume) = volume {
                mixer.set_master_volume(volume.clamp(0.0, f64::from(MAX_MASTER_VOLUME)) as u8);
            }
            Ok(mixer.master_volume())
        })?,
    )?;

    lua.globals().set("Sound", table)
}
