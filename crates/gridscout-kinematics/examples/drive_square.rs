use gridscout_kinematics::*;

fn main() {
    let forward = Twist::new(60.0, 0.0); // 60 units/s straight ahead
    let turn = Twist::new(0.0, 90.0); // 90 deg/s on the spot
    let dt = 0.5; // Time step in seconds

    let mut current_pose = Pose::new(400.0, 300.0, 0.0);
    println!("Initial Pose: {}", current_pose);
    println!("Driving a square with side {} units...", forward.forward * dt * 4.0);

    for side in 0..4 {
        for step in 0..4 {
            match current_pose.advance(forward, dt) {
                Ok(new_pose) => current_pose = new_pose,
                Err(e) => {
                    eprintln!("Error on side {} step {}: {:?}", side + 1, step + 1, e);
                    return;
                }
            }
        }
        // One second of turning at 90 deg/s
        for _ in 0..2 {
            match current_pose.advance(turn, dt) {
                Ok(new_pose) => current_pose = new_pose,
                Err(e) => {
                    eprintln!("Error while turning after side {}: {:?}", side + 1, e);
                    return;
                }
            }
        }
        println!("Side {}: Pose: {}", side + 1, current_pose);
    }

    println!("Final Pose: {}", current_pose);
}
