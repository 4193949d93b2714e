use std::{env, process};

use roomkit::{
    builder::SceneBuilder,
    launch,
    orbit::OrbitController,
    room,
    scene::{Camera, Scene},
    ConfigParams, SceneScript, WindowParams,
};

use glam::Vec3;
use log;
use log4rs;
use winit::event::WindowEvent;

const CAMERA_FOV: f32 = std::f32::consts::FRAC_PI_4;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 1000.0;

struct RoomScript {
    scene: Scene,
    orbit: OrbitController,
    aspect: f32,
}

impl SceneScript for RoomScript {
    fn new(params: &ConfigParams) -> RoomScript {
        let mut builder = SceneBuilder::new(params.graphics.physically_correct_lights);
        builder
            .build(&room::DEFAULT_ROOM)
            .expect("room assembly failed");

        for object in builder.room_objects() {
            log::info!(
                "room object: {}",
                object.borrow().name().map(String::as_str).unwrap_or("?")
            );
        }

        let mut orbit = OrbitController::new(10.0);
        orbit.set_target(Vec3::ZERO);

        let aspect = match params.window.height {
            0 => 1.0,
            h => params.window.width as f32 / h as f32,
        };

        RoomScript {
            scene: builder.into_scene(),
            orbit,
            aspect,
        }
    }

    fn scene(&self) -> Scene {
        self.scene.clone()
    }

    fn update(&mut self) {
        self.orbit.update();
        let mut camera = self.scene.camera.borrow_mut();
        camera.set_transform(self.orbit.view());
        camera.set_camera(Camera::perspective(
            self.aspect,
            CAMERA_FOV,
            CAMERA_NEAR,
            CAMERA_FAR,
        ));
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    fn on_window_event(&mut self, event: &WindowEvent<'_>) {
        self.orbit.handle_window_event(event);
    }
}

fn main() {
    init_log(log::LevelFilter::Info, "deskroom.log");

    let mut params = ConfigParams {
        window: WindowParams {
            width: 1280,
            height: 720,
            title: "Desk Room".into(),
            ..Default::default()
        },
        ..Default::default()
    };
    for arg in env::args() {
        if arg == "--fullscreen" {
            params.window.fullscreen = true;
        } else if arg == "--resizeable" {
            params.window.resizeable = true;
        }
    }

    if let Err(e) = launch::<RoomScript>(params) {
        log::error!("viewer failed: {}", e);
        process::exit(1);
    }
}

fn init_log(level: log::LevelFilter, log_file_name: &str) {
    use log4rs::{
        append::{console, file},
        config,
        encode::pattern,
        init_config,
    };

    let stdout = console::ConsoleAppender::builder()
        .encoder(Box::new(pattern::PatternEncoder::new(
            "[Console] {d} - {l} - {t} - {m}{n}",
        )))
        .build();

    let file = file::FileAppender::builder()
        .encoder(Box::new(pattern::PatternEncoder::new(
            "[File] {d} - {l} - {t} - {m}{n}",
        )))
        .append(false)
        .build(log_file_name)
        .unwrap();

    let config = config::Config::builder()
        .appender(config::Appender::builder().build("stdout", Box::new(stdout)))
        .appender(config::Appender::builder().build("file", Box::new(file)))
        .build(
            config::Root::builder()
                .appender("stdout")
                .appender("file")
                .build(level),
        )
        .unwrap();

    let _ = init_config(config).unwrap();
}
